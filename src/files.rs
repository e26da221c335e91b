//! Text file primitives shared by the sanitizer and the verifier.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{CheckError, Result};

/// Reads a UTF-8 file, normalising `\r\n` and lone `\r` to `\n`.
pub fn read_text(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path).map_err(|source| CheckError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(normalize_newlines(&raw))
}

/// Writes `text` verbatim, replacing any existing content.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|source| CheckError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// `path` with `suffix` appended to its final component (`a.cpp` -> `a.cpp.msg`).
pub fn with_appended(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
