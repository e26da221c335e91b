//! # Fake collaborators for orchestration tests
//!
//! `FakeTools` stands in for both external commands. As `clang-tidy` it
//! applies scripted rewrites to the files it was handed and prints scripted
//! diagnostics; as `FileCheck` it runs a small in-order matcher that knows
//! `{{regex}}` blocks, `-check-prefixes` and `-implicit-check-not`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use check_clang_tidy::config::RunConfiguration;
use check_clang_tidy::process::{CommandOutput, CommandRunner};
use check_clang_tidy::Result;
use regex::Regex;

pub const TIDY: &str = "fake-clang-tidy";
pub const FILECHECK: &str = "fake-FileCheck";

/// Working copy name for the default configuration of [`Workspace::config`].
pub const MAIN: &str = "test.cpp.tmp.cpp";

/// One recorded `clang-tidy` invocation.
#[derive(Debug, Clone)]
pub struct TidyCall {
    pub args: Vec<String>,
    /// Content of the main temp file when the tool started.
    pub input_seen: String,
}

#[derive(Debug, Default)]
pub struct FakeTools {
    /// `(file name, from, to)` replacements applied in the temp directory.
    pub rewrites: Vec<(String, String, String)>,
    pub diagnostics: String,
    pub tidy_status: i32,
    /// Report the tool as killed by a signal instead of exiting.
    pub tidy_killed: bool,
    pub tidy_calls: Vec<TidyCall>,
    pub filecheck_calls: Vec<Vec<String>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rewrite(mut self, file: &str, from: &str, to: &str) -> Self {
        self.rewrites
            .push((file.to_string(), from.to_string(), to.to_string()));
        self
    }

    pub fn emit(mut self, diagnostics: &str) -> Self {
        self.diagnostics = diagnostics.to_string();
        self
    }

    pub fn exit_with(mut self, status: i32) -> Self {
        self.tidy_status = status;
        self
    }

    pub fn killed(mut self) -> Self {
        self.tidy_killed = true;
        self
    }

    fn run_tidy(&mut self, args: &[String]) -> CommandOutput {
        let main = PathBuf::from(&args[0]);
        let dir = main.parent().map(Path::to_path_buf).unwrap_or_default();
        let input_seen = fs::read_to_string(&main).unwrap_or_default();
        for (file, from, to) in &self.rewrites {
            let path = dir.join(file);
            if let Ok(text) = fs::read_to_string(&path) {
                fs::write(&path, text.replace(from.as_str(), to.as_str())).unwrap();
            }
        }
        self.tidy_calls.push(TidyCall {
            args: args.to_vec(),
            input_seen,
        });
        CommandOutput {
            status: (!self.tidy_killed).then_some(self.tidy_status),
            output: self.diagnostics.clone(),
        }
    }

    fn run_filecheck(&mut self, args: &[String]) -> CommandOutput {
        self.filecheck_calls.push(args.to_vec());
        match mini_filecheck(args) {
            Ok(()) => CommandOutput {
                status: Some(0),
                output: String::new(),
            },
            Err(message) => CommandOutput {
                status: Some(1),
                output: message,
            },
        }
    }
}

impl CommandRunner for FakeTools {
    fn run(&mut self, program: &str, args: &[String]) -> Result<CommandOutput> {
        Ok(match program {
            TIDY => self.run_tidy(args),
            FILECHECK => self.run_filecheck(args),
            other => panic!("unexpected program {other}"),
        })
    }
}

/// Turns a FileCheck pattern into a regex: literals escaped, `{{..}}` kept.
fn pattern_regex(pattern: &str) -> Regex {
    let mut re = String::new();
    let mut rest = pattern;
    while let Some(start) = rest.find("{{") {
        re.push_str(&regex::escape(&rest[..start]));
        let end = rest[start..].find("}}").expect("unterminated {{") + start;
        re.push_str("(?:");
        re.push_str(&rest[start + 2..end]);
        re.push(')');
        rest = &rest[end + 2..];
    }
    re.push_str(&regex::escape(rest));
    Regex::new(&re).unwrap()
}

fn mini_filecheck(args: &[String]) -> std::result::Result<(), String> {
    let mut input = None;
    let mut reference = None;
    let mut prefixes = Vec::new();
    let mut forbidden = None;
    for arg in args {
        if let Some(v) = arg.strip_prefix("-input-file=") {
            input = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("-check-prefixes=") {
            prefixes = v.split(',').map(str::to_string).collect();
        } else if let Some(v) = arg.strip_prefix("-implicit-check-not=") {
            forbidden = Some(pattern_regex(v));
        } else if !arg.starts_with('-') {
            reference = Some(PathBuf::from(arg));
        }
    }
    let input = fs::read_to_string(input.ok_or("no input")?).map_err(|e| e.to_string())?;
    let reference = fs::read_to_string(reference.ok_or("no reference")?).map_err(|e| e.to_string())?;

    let mut patterns = Vec::new();
    for line in reference.lines() {
        for prefix in &prefixes {
            let tag = format!("{prefix}:");
            if let Some(pos) = line.find(&tag) {
                patterns.push(pattern_regex(line[pos + tag.len()..].trim_start()));
            }
        }
    }
    if patterns.is_empty() {
        return Err("error: no check strings found with prefixes".to_string());
    }

    let lines: Vec<&str> = input.lines().collect();
    let mut matched = Vec::new();
    let mut cursor = 0;
    for pattern in &patterns {
        let found = (cursor..lines.len()).find(|i| pattern.is_match(lines[*i]));
        match found {
            Some(i) => {
                matched.push(i);
                cursor = i + 1;
            }
            None => return Err(format!("error: expected string not found: {}", pattern.as_str())),
        }
    }
    if let Some(forbidden) = forbidden {
        for (i, line) in lines.iter().enumerate() {
            if !matched.contains(&i) && forbidden.is_match(line) {
                return Err(format!("error: unexpected line: {line}"));
            }
        }
    }
    Ok(())
}

/// A scratch test layout: `src/` for inputs, `out/` for temp files.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("out")).unwrap();
        Self { dir }
    }

    pub fn source(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join("src").join(name);
        fs::write(&path, text).unwrap();
        path
    }

    pub fn out(&self, name: &str) -> PathBuf {
        self.dir.path().join("out").join(name)
    }

    pub fn config(&self, input: &Path) -> RunConfiguration {
        let mut config = RunConfiguration::new(input, "misc-test-check", self.out("test.cpp.tmp"));
        config.clang_tidy = TIDY.to_string();
        config.filecheck = FILECHECK.to_string();
        config
    }
}
