//! Error handling for the harness.
//!
//! Every failure is fatal: configuration problems are caught before the
//! analysis tool runs, tool and verification failures stop the process
//! with the captured output already printed. Each variant carries a stable
//! `miette` diagnostic code so CLI regressions can match on it.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(Error, Diagnostic, Debug)]
pub enum CheckError {
    // ------------------------------------------------------------------
    // Configuration errors, raised before any external command runs
    // ------------------------------------------------------------------
    #[error(
        "Only A..Z, 0..9 and \"-\" are allowed in check suffixes list, but \"{suffix}\" was given"
    )]
    #[diagnostic(code(check_clang_tidy::config::invalid_suffix))]
    InvalidSuffix { suffix: String },

    #[error("Please use either {notes} or {messages} but not both")]
    #[diagnostic(
        code(check_clang_tidy::config::conflicting_prefixes),
        help("notes checking already verifies warnings and errors; drop one of the two prefixes")
    )]
    ConflictingPrefixes { notes: String, messages: String },

    #[error("{fixes}, {messages} or {notes} not found in the input")]
    #[diagnostic(code(check_clang_tidy::config::missing_prefixes))]
    MissingPrefixes {
        fixes: String,
        messages: String,
        notes: String,
    },

    #[error("no CHECK-FIXES, CHECK-MESSAGES or CHECK-NOTES annotations were found for any suffix")]
    #[diagnostic(code(check_clang_tidy::config::no_prefixes))]
    NoPrefixesFound,

    // ------------------------------------------------------------------
    // Filesystem errors
    // ------------------------------------------------------------------
    #[error("failed to read '{}'", .path.display())]
    #[diagnostic(code(check_clang_tidy::io::read))]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{}'", .path.display())]
    #[diagnostic(code(check_clang_tidy::io::write))]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ------------------------------------------------------------------
    // External command errors
    // ------------------------------------------------------------------
    #[error("failed to start '{program}'")]
    #[diagnostic(
        code(check_clang_tidy::tool::spawn),
        help("check that the binary is installed or point the harness at it explicitly")
    )]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture the output of '{program}'")]
    #[diagnostic(code(check_clang_tidy::tool::capture))]
    Capture {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed with {status}")]
    #[diagnostic(code(check_clang_tidy::tool::failed))]
    ToolFailed { command: String, status: String },

    #[error("{command} succeeded, but a failure was expected")]
    #[diagnostic(
        code(check_clang_tidy::tool::unexpected_success),
        help("remove --expect-clang-tidy-error if the check is supposed to succeed")
    )]
    ToolUnexpectedSuccess { command: String },

    // ------------------------------------------------------------------
    // Verification errors
    // ------------------------------------------------------------------
    #[error("{kind} verification failed for '{}'", .reference.display())]
    #[diagnostic(code(check_clang_tidy::verify::mismatch))]
    VerificationFailed { kind: String, reference: PathBuf },
}

impl CheckError {
    /// True for errors detected before the analysis tool is invoked.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CheckError::InvalidSuffix { .. }
                | CheckError::ConflictingPrefixes { .. }
                | CheckError::MissingPrefixes { .. }
                | CheckError::NoPrefixesFound
        )
    }
}
