//! The external command collaborator.
//!
//! Both the analysis tool and the pattern matcher are plain processes: the
//! harness only needs their combined output and exit status. Everything
//! goes through [`CommandRunner`] so the orchestration can be driven by a
//! fake in tests.

use std::io::Read;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::errors::{CheckError, Result};

/// Captured result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was killed by a signal.
    pub status: Option<i32>,
    /// Standard output and standard error, interleaved as they were written.
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn status_text(&self) -> String {
        match self.status {
            Some(code) => format!("exit status {}", code),
            None => "termination by signal".to_string(),
        }
    }
}

/// Runs a command to completion and captures its output. Blocking.
pub trait CommandRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Spawns real processes with [`std::process::Command`].
///
/// Both output streams of the child share one pipe, so the captured text
/// keeps the order in which the tool wrote its lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!(program, ?args, "spawning");
        let spawn_error = |source| CheckError::Spawn {
            program: program.to_string(),
            source,
        };
        let capture_error = |source| CheckError::Capture {
            program: program.to_string(),
            source,
        };

        let (mut reader, writer) = std::io::pipe().map_err(spawn_error)?;
        let stderr_writer = writer.try_clone().map_err(spawn_error)?;
        // The command owns the write ends; dropping it after the spawn
        // leaves the child as the only writer, so the read below ends.
        let mut child = {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(writer)
                .stderr(stderr_writer);
            command.spawn().map_err(spawn_error)?
        };

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(capture_error)?;
        let status = child.wait().map_err(capture_error)?;

        let captured = CommandOutput {
            status: status.code(),
            output: String::from_utf8_lossy(&bytes).into_owned(),
        };
        info!(program, status = ?captured.status, "command finished");
        Ok(captured)
    }
}

/// Space-joined command line for messages.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
