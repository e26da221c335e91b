//! The `check-clang-tidy` command line.
//!
//! Positional arguments name the test source, the check under test and the
//! temp-file base. Anything after them that the harness does not recognize,
//! and everything after the first `--`, is forwarded to the analysis tool; a
//! further `--` inside that tail separates tool arguments from compiler
//! arguments.

use std::{path::PathBuf, process};

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::RunConfiguration, output::Reporter, process::SystemRunner, run::run_all};

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "check-clang-tidy",
    version,
    about = "Runs clang-tidy in fix mode and verifies fixes, messages or notes."
)]
pub struct CheckArgs {
    /// The annotated test source.
    pub input_file: PathBuf,

    /// The single check to enable, e.g. `modernize-use-nullptr`.
    pub check_name: String,

    /// Base path for the temp copies; an extension is appended.
    pub temp_file: PathBuf,

    /// Passed to the compiler as `-resource-dir=<DIR>`.
    #[arg(long)]
    pub resource_dir: Option<PathBuf>,

    /// Headers next to the input file that are checked as well.
    #[arg(long, value_delimiter = ',')]
    pub check_headers: Vec<String>,

    /// File name used to pick the source language instead of the input's.
    #[arg(long)]
    pub assume_filename: Option<String>,

    /// FileCheck suffixes; each adds `-<SUFFIX>` to the CHECK prefixes.
    #[arg(long, alias = "check-suffixes", value_delimiter = ',')]
    pub check_suffix: Vec<String>,

    /// Language standards, e.g. `c++17` or `c++11-or-later`.
    #[arg(long, value_delimiter = ',', default_value = "c++11-or-later")]
    pub std: Vec<String>,

    /// Succeed only if clang-tidy exits with a failure.
    #[arg(long)]
    pub expect_clang_tidy_error: bool,

    #[arg(long, env = "CLANG_TIDY", default_value = "clang-tidy")]
    pub clang_tidy_binary: String,

    #[arg(long, env = "FILECHECK", default_value = "FileCheck")]
    pub filecheck_binary: String,

    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Forwarded arguments: `[tool args] [-- compiler args]`. Unrecognized
    /// arguments after the positionals land here as well.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto if atty::is(atty::Stream::Stdout) => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
        }
    }
}

impl CheckArgs {
    pub fn into_config(self) -> RunConfiguration {
        let mut config = RunConfiguration::new(self.input_file, self.check_name, self.temp_file)
            .with_extra_args(self.extra_args);
        config.resource_dir = self.resource_dir;
        config.check_headers = self.check_headers.into_iter().filter(|h| !h.is_empty()).collect();
        config.assume_filename = self.assume_filename;
        if !self.check_suffix.is_empty() {
            config.check_suffixes = self.check_suffix;
        }
        config.standards = self.std;
        config.expect_tool_error = self.expect_clang_tidy_error;
        config.clang_tidy = self.clang_tidy_binary;
        config.filecheck = self.filecheck_binary;
        config.color = self.color.choice();
        config
    }
}

/// Long options that lit RUN lines spell with a single dash.
const LEGACY_FLAGS: [&str; 7] = [
    "expect-clang-tidy-error",
    "resource-dir",
    "check-headers",
    "assume-filename",
    "check-suffix",
    "check-suffixes",
    "std",
];

/// Rewrites `-check-suffix=A` style options to `--check-suffix=A`.
///
/// Only arguments before the first `--` are touched; forwarded arguments
/// such as `-std=c++17` for the compiler stay as they are.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut forwarding = false;
    args.into_iter()
        .map(|arg| {
            if forwarding {
                return arg;
            }
            if arg == "--" {
                forwarding = true;
                return arg;
            }
            match arg.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') && is_legacy_flag(rest) => format!("-{}", arg),
                _ => arg,
            }
        })
        .collect()
}

fn is_legacy_flag(option: &str) -> bool {
    let name = option.split_once('=').map_or(option, |(name, _)| name);
    LEGACY_FLAGS.contains(&name)
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Logs go to stderr so they never mix with the banners on stdout. Silent
/// unless `RUST_LOG` asks for events.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialises logging, parses the command line, runs every standard and
/// exits non-zero on failure.
pub fn run() {
    init_logging();
    let args = CheckArgs::parse_from(normalize_legacy_flags(std::env::args()));
    let config = args.into_config();
    let mut reporter = Reporter::stdout(config.color);

    match run_all(&config, &mut SystemRunner, &mut reporter) {
        Ok(reports) => {
            let _ = reporter.flush();
            info!(runs = reports.len(), "all runs passed");
        }
        Err(e) => {
            let _ = reporter.flush();
            let report = miette::Report::new(e);
            eprintln!("{report:?}");
            process::exit(1);
        }
    }
}
