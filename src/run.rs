//! One verification cycle per concrete language standard.
//!
//! An [`OrchestrationRun`] owns every piece of state for its standard: the
//! resolved temp paths, the input texts, the discovered prefixes and the
//! captured tool output. Runs are built from the shared configuration and
//! never see each other's state. They execute strictly one after another
//! because they reuse the same temp paths on disk.

use std::path::{Path, PathBuf};

use termcolor::WriteColor;
use tracing::{info, warn};

use crate::annotations::{AnnotationKind, AnnotationSet};
use crate::config::RunConfiguration;
use crate::errors::{CheckError, Result};
use crate::files::{read_text, with_appended};
use crate::output::Reporter;
use crate::process::{render_command, CommandRunner};
use crate::sanitize::write_sanitized;
use crate::standards::expand_all;
use crate::verify::{Verifier, VerifyTarget};

/// An auxiliary header checked alongside the main input.
#[derive(Debug, Clone)]
pub struct HeaderFile {
    /// Annotated header next to the input file.
    pub source: PathBuf,
    /// Sanitized copy beside the temp file, seen by the tool.
    pub working: PathBuf,
    /// Diff baseline for `working`.
    pub shadow: PathBuf,
    pub text: String,
}

/// What one run verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub standard: String,
    pub temp_file: PathBuf,
    pub verified: Vec<AnnotationKind>,
}

pub struct OrchestrationRun<'c> {
    config: &'c RunConfiguration,
    standard: String,
    temp_file: PathBuf,
    original_file: PathBuf,
    input_text: String,
    headers: Vec<HeaderFile>,
    annotations: AnnotationSet,
    tool_output: String,
}

impl<'c> OrchestrationRun<'c> {
    pub fn new(config: &'c RunConfiguration, standard: impl Into<String>) -> Self {
        let temp_file = with_appended(&config.temp_file, config.language().extension());
        let original_file = with_appended(&config.temp_file, ".orig");
        Self {
            config,
            standard: standard.into(),
            temp_file,
            original_file,
            input_text: String::new(),
            headers: Vec::new(),
            annotations: AnnotationSet::default(),
            tool_output: String::new(),
        }
    }

    pub fn temp_file(&self) -> &Path {
        &self.temp_file
    }

    pub fn original_file(&self) -> &Path {
        &self.original_file
    }

    /// Runs the whole cycle: read, scan, sanitize, invoke, diff, verify.
    pub fn run<R, W>(mut self, runner: &mut R, reporter: &mut Reporter<W>) -> Result<RunReport>
    where
        R: CommandRunner,
        W: WriteColor,
    {
        info!(standard = %self.standard, temp = %self.temp_file.display(), "starting run");
        self.read_input()?;
        self.annotations = AnnotationSet::scan(&self.input_text, &self.config.check_suffixes)?;
        self.prepare_test_inputs()?;
        self.run_clang_tidy(runner, reporter)?;
        self.show_fixes(reporter);
        let verified = self.verify(runner, reporter)?;
        Ok(RunReport {
            standard: self.standard,
            temp_file: self.temp_file,
            verified,
        })
    }

    fn read_input(&mut self) -> Result<()> {
        self.input_text = read_text(&self.config.input_file)?;

        let input_dir = parent_dir(&self.config.input_file);
        let temp_dir = parent_dir(&self.temp_file);
        self.headers = Vec::with_capacity(self.config.check_headers.len());
        for header in &self.config.check_headers {
            let source = input_dir.join(header);
            let text = read_text(&source)?;
            let base = Path::new(header)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(header));
            let working = temp_dir.join(&base);
            let shadow = with_appended(&working, ".orig");
            self.headers.push(HeaderFile {
                source,
                working,
                shadow,
                text,
            });
        }
        Ok(())
    }

    fn prepare_test_inputs(&self) -> Result<()> {
        write_sanitized(&self.input_text, &self.temp_file, &self.original_file)?;
        for header in &self.headers {
            write_sanitized(&header.text, &header.working, &header.shadow)?;
        }
        Ok(())
    }

    fn tool_args(&self) -> Vec<String> {
        let mut args = vec![
            self.temp_file.display().to_string(),
            "-fix".to_string(),
            format!("--checks=-*,{}", self.config.check_name),
        ];
        args.extend(self.config.effective_tool_args());
        args.push("--".to_string());
        args.extend(self.config.effective_compiler_args(&self.standard));
        args
    }

    fn run_clang_tidy<R, W>(&mut self, runner: &mut R, reporter: &mut Reporter<W>) -> Result<()>
    where
        R: CommandRunner,
        W: WriteColor,
    {
        let program = self.config.clang_tidy.as_str();
        let args = self.tool_args();
        reporter.running(program, &args);

        let result = runner.run(program, &args)?;
        let command = render_command(program, &args);
        // An expected failure still needs a real exit code; a tool killed
        // by a signal fails the run either way.
        match (result.status, self.config.expect_tool_error) {
            (Some(0), false) => {}
            (Some(code), true) if code != 0 => {}
            (Some(0), true) => {
                reporter.command_failed(&format!("not {}", command), &result.output);
                return Err(CheckError::ToolUnexpectedSuccess { command });
            }
            (_, expected) => {
                let shown = if expected {
                    format!("not {}", command)
                } else {
                    command.clone()
                };
                reporter.command_failed(&shown, &result.output);
                return Err(CheckError::ToolFailed {
                    command,
                    status: result.status_text(),
                });
            }
        }

        reporter.tool_output(&result.output);
        self.tool_output = result.output;
        Ok(())
    }

    /// Diffs are informational only; an unreadable copy is logged and skipped.
    fn show_fixes<W: WriteColor>(&self, reporter: &mut Reporter<W>) {
        let mut pairs = vec![(self.original_file.clone(), self.temp_file.clone())];
        pairs.extend(
            self.headers
                .iter()
                .map(|h| (h.shadow.clone(), h.working.clone())),
        );

        let mut texts = Vec::with_capacity(pairs.len());
        for (shadow, working) in pairs {
            match (read_text(&shadow), read_text(&working)) {
                (Ok(before), Ok(after)) => texts.push((shadow, before, working, after)),
                (Err(e), _) | (_, Err(e)) => warn!(error = %e, "skipping diff"),
            }
        }
        reporter.fixes(
            texts
                .iter()
                .map(|(s, b, w, a)| (s.as_path(), b.as_str(), w.as_path(), a.as_str())),
        );
    }

    fn verify<R, W>(&self, runner: &mut R, reporter: &mut Reporter<W>) -> Result<Vec<AnnotationKind>>
    where
        R: CommandRunner,
        W: WriteColor,
    {
        let mut targets = vec![VerifyTarget {
            working: self.temp_file.clone(),
            reference: self.config.input_file.clone(),
        }];
        targets.extend(self.headers.iter().map(|h| VerifyTarget {
            working: h.working.clone(),
            reference: h.source.clone(),
        }));

        let mut verifier = Verifier {
            filecheck: &self.config.filecheck,
            runner,
            reporter,
        };
        let mut verified = Vec::new();
        for kind in AnnotationKind::ALL {
            let prefix = self.annotations.get(kind);
            let mut checked = false;
            for target in &targets {
                checked |= verifier.verify(prefix, target, &self.tool_output)?;
            }
            if checked {
                verified.push(kind);
            }
        }
        Ok(verified)
    }
}

/// Runs every expanded standard in order, stopping at the first failure.
pub fn run_all<R, W>(
    config: &RunConfiguration,
    runner: &mut R,
    reporter: &mut Reporter<W>,
) -> Result<Vec<RunReport>>
where
    R: CommandRunner,
    W: WriteColor,
{
    let mut reports = Vec::new();
    for standard in expand_all(&config.standards) {
        let report = OrchestrationRun::new(config, standard).run(runner, reporter)?;
        reports.push(report);
    }
    Ok(reports)
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
