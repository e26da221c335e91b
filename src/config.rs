//! Immutable run configuration and the flags derived from it.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use termcolor::ColorChoice;

static CONFIG_ARG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?-config(-file)?=").unwrap());

/// Compiler flags that let Objective-C tests build without a runtime.
const OBJC_FLAGS: [&str; 3] = ["-fobjc-abi-version=2", "-fobjc-arc", "-fblocks"];

/// Tests provide mock declarations instead of relying on an installed STL.
const NO_STDLIB_FLAG: &str = "-nostdinc++";

/// Passed to the tool unless the test picks its own configuration.
const EMPTY_CONFIG_FLAG: &str = "--config={}";

/// Everything the harness needs for one invocation. Never mutated.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub input_file: PathBuf,
    pub check_name: String,
    pub temp_file: PathBuf,
    pub assume_filename: Option<String>,
    pub check_headers: Vec<String>,
    pub resource_dir: Option<PathBuf>,
    pub check_suffixes: Vec<String>,
    pub standards: Vec<String>,
    pub expect_tool_error: bool,
    /// Arguments for the analysis tool itself.
    pub tool_args: Vec<String>,
    /// Arguments for the compiler, after the tool's own `--`.
    pub compiler_args: Vec<String>,
    pub clang_tidy: String,
    pub filecheck: String,
    pub color: ColorChoice,
}

impl RunConfiguration {
    pub fn new(
        input_file: impl Into<PathBuf>,
        check_name: impl Into<String>,
        temp_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_file: input_file.into(),
            check_name: check_name.into(),
            temp_file: temp_file.into(),
            assume_filename: None,
            check_headers: Vec::new(),
            resource_dir: None,
            check_suffixes: vec![String::new()],
            standards: vec!["c++11-or-later".to_string()],
            expect_tool_error: false,
            tool_args: Vec::new(),
            compiler_args: Vec::new(),
            clang_tidy: "clang-tidy".to_string(),
            filecheck: "FileCheck".to_string(),
            color: ColorChoice::Never,
        }
    }

    /// Splits forwarded arguments at the first `--` into tool and compiler arguments.
    pub fn with_extra_args(mut self, extra: Vec<String>) -> Self {
        let (tool, compiler) = split_extra_args(extra);
        self.tool_args = tool;
        self.compiler_args = compiler;
        self
    }

    /// Language of the test, from the assumed filename or else the input name.
    pub fn language(&self) -> SourceLanguage {
        let name = self
            .assume_filename
            .as_deref()
            .map(Path::new)
            .unwrap_or(self.input_file.as_path());
        SourceLanguage::from_path(name)
    }

    /// Tool arguments as passed before the compiler separator.
    pub fn effective_tool_args(&self) -> Vec<String> {
        let mut args = self.tool_args.clone();
        if !args.iter().any(|a| CONFIG_ARG_RE.is_match(a)) {
            args.push(EMPTY_CONFIG_FLAG.to_string());
        }
        args
    }

    /// Compiler arguments for one concrete standard.
    pub fn effective_compiler_args(&self, standard: &str) -> Vec<String> {
        let language = self.language();
        let mut args = Vec::new();
        if language.is_objc() {
            args.extend(OBJC_FLAGS.iter().map(|f| f.to_string()));
        }
        args.extend(self.compiler_args.iter().cloned());
        if language.takes_std_flag() {
            args.push(format!("-std={}", standard));
        }
        args.push(NO_STDLIB_FLAG.to_string());
        if let Some(dir) = &self.resource_dir {
            args.push(format!("-resource-dir={}", dir.display()));
        }
        args
    }
}

/// `(tool, compiler)` halves of the forwarded arguments.
pub fn split_extra_args(extra: Vec<String>) -> (Vec<String>, Vec<String>) {
    match extra.iter().position(|a| a == "--") {
        Some(i) => {
            let mut tool = extra;
            let compiler = tool.split_off(i + 1);
            tool.pop();
            (tool, compiler)
        }
        None => (extra, Vec::new()),
    }
}

/// Source language of a test, which fixes the temp file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    C,
    Cxx,
    CxxHeader,
    ObjC,
    ObjCxx,
}

impl SourceLanguage {
    /// Unknown or missing extensions default to C++.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("c") => SourceLanguage::C,
            Some("hpp") => SourceLanguage::CxxHeader,
            Some("m") => SourceLanguage::ObjC,
            Some("mm") => SourceLanguage::ObjCxx,
            _ => SourceLanguage::Cxx,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceLanguage::C => ".c",
            SourceLanguage::Cxx => ".cpp",
            SourceLanguage::CxxHeader => ".hpp",
            SourceLanguage::ObjC => ".m",
            SourceLanguage::ObjCxx => ".mm",
        }
    }

    pub fn is_objc(&self) -> bool {
        matches!(self, SourceLanguage::ObjC | SourceLanguage::ObjCxx)
    }

    pub fn takes_std_flag(&self) -> bool {
        matches!(
            self,
            SourceLanguage::Cxx | SourceLanguage::CxxHeader | SourceLanguage::ObjCxx
        )
    }
}
