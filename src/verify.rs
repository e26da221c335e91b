//! Verification of fixes, messages and notes through `FileCheck`.
//!
//! The harness never interprets diagnostics itself. It writes the text to
//! verify into a file and lets the matcher check it against the annotated
//! reference, with the discovered prefixes as the recognised check tags.

use std::path::{Path, PathBuf};

use termcolor::WriteColor;
use tracing::{debug, info};

use crate::annotations::{AnnotationKind, AnnotationPrefix};
use crate::errors::{CheckError, Result};
use crate::files::{with_appended, write_text};
use crate::output::Reporter;
use crate::process::{render_command, CommandRunner};

/// Emitted by the tool for every applied fix; not a diagnostic under test.
pub const FIX_IT_MARKER: &str = "note: FIX-IT applied";

/// A file the tool worked on and the annotated file describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyTarget {
    /// Sanitized copy the tool rewrote in place.
    pub working: PathBuf,
    /// Annotated source holding the `CHECK-*` lines.
    pub reference: PathBuf,
}

/// Drops every line carrying [`FIX_IT_MARKER`].
pub fn filter_fix_notes(output: &str) -> String {
    output
        .lines()
        .filter(|line| !line.contains(FIX_IT_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Matcher arguments for one kind.
///
/// Fixes are whitespace-sensitive. Messages and notes additionally reject
/// any unmatched diagnostic of the severities they cover.
pub fn filecheck_args(
    kind: AnnotationKind,
    prefixes: &[String],
    input: &Path,
    reference: &Path,
) -> Vec<String> {
    let mut args = vec![
        format!("-input-file={}", input.display()),
        reference.display().to_string(),
        format!("-check-prefixes={}", prefixes.join(",")),
    ];
    match kind {
        AnnotationKind::Fixes => args.push("-strict-whitespace".to_string()),
        AnnotationKind::Messages => args.push("-implicit-check-not={{warning|error}}:".to_string()),
        AnnotationKind::Notes => {
            args.push("-implicit-check-not={{note|warning|error}}:".to_string())
        }
    }
    args
}

pub struct Verifier<'a, R: CommandRunner, W: WriteColor> {
    pub filecheck: &'a str,
    pub runner: &'a mut R,
    pub reporter: &'a mut Reporter<W>,
}

impl<'a, R: CommandRunner, W: WriteColor> Verifier<'a, R, W> {
    /// Checks one target for one kind. Kinds without prefixes are skipped.
    pub fn verify(
        &mut self,
        prefix: &AnnotationPrefix,
        target: &VerifyTarget,
        tool_output: &str,
    ) -> Result<bool> {
        if !prefix.is_found() {
            return Ok(false);
        }
        let kind = prefix.kind();
        let input = match kind {
            AnnotationKind::Fixes => target.working.clone(),
            AnnotationKind::Messages => {
                let path = with_appended(&target.working, ".msg");
                write_text(&path, tool_output)?;
                path
            }
            AnnotationKind::Notes => {
                let path = with_appended(&target.working, ".notes");
                write_text(&path, &filter_fix_notes(tool_output))?;
                path
            }
        };

        let args = filecheck_args(kind, prefix.prefixes(), &input, &target.reference);
        debug!(%kind, input = %input.display(), "running matcher");
        let result = self.runner.run(self.filecheck, &args)?;
        if !result.success() {
            self.reporter
                .command_failed(&render_command(self.filecheck, &args), &result.output);
            return Err(CheckError::VerificationFailed {
                kind: kind.to_string(),
                reference: target.reference.clone(),
            });
        }
        info!(%kind, reference = %target.reference.display(), "verified");
        Ok(true)
    }
}
