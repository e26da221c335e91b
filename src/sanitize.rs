//! Blanking of annotation lines before the analysis tool sees the input.
//!
//! `CHECK-*` lines would otherwise match against themselves once the tool
//! echoes source lines in its diagnostics. The comment marker is kept so
//! line numbers stay valid and no empty lines appear that a formatting
//! check could flag.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::Result;
use crate::files::write_text;

static CHECK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"// *CHECK-[A-Z0-9\-]*:[^\r\n]*").unwrap());

/// Replaces every `// CHECK-<TAG>: ...` tail with a bare `//`.
pub fn sanitize(text: &str) -> String {
    CHECK_LINE_RE.replace_all(text, "//").into_owned()
}

/// Writes the sanitized text to both the working copy and its shadow.
///
/// The working copy is handed to the tool and rewritten in place; the
/// shadow stays untouched as the diff baseline.
pub fn write_sanitized(text: &str, working: &Path, shadow: &Path) -> Result<String> {
    let cleaned = sanitize(text);
    write_text(working, &cleaned)?;
    write_text(shadow, &cleaned)?;
    debug!(
        working = %working.display(),
        shadow = %shadow.display(),
        "wrote sanitized copies"
    );
    Ok(cleaned)
}
