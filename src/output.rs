//! User-facing output: banners around the tool output and the fixes diff.
//!
//! Everything the harness prints goes through [`Reporter`] so a failing
//! test leaves enough context in the log to diagnose it without a rerun.

use std::io::{self, Write};
use std::path::Path;

use difference::{Changeset, Difference};
use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

const RULE: &str = "------------------------------------------------------------------";

/// Writes harness output to any colour-aware sink.
pub struct Reporter<W: WriteColor> {
    out: W,
}

impl Reporter<StandardStream> {
    pub fn stdout(choice: ColorChoice) -> Self {
        Self::new(StandardStream::stdout(choice))
    }
}

impl Reporter<Buffer> {
    /// In-memory reporter without colours.
    pub fn buffer() -> Self {
        Self::new(Buffer::no_color())
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(self.out.as_slice()).into_owned()
    }
}

impl<W: WriteColor> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// `Running [...]...` line printed before the tool is started.
    pub fn running(&mut self, program: &str, args: &[String]) {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(program);
        all.extend(args.iter().map(String::as_str));
        let _ = writeln!(self.out, "Running {:?}...", all);
    }

    pub fn tool_output(&mut self, output: &str) {
        self.banner("------------------------ clang-tidy output -----------------------");
        let _ = writeln!(self.out, "{}", output);
        let _ = writeln!(self.out, "{}", RULE);
    }

    /// Prints the diff of every shadow/working pair under a `Fixes` banner.
    pub fn fixes<'a, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'a Path, &'a str, &'a Path, &'a str)>,
    {
        self.banner("------------------------------ Fixes -----------------------------");
        for (shadow, before, working, after) in pairs {
            self.diff(shadow, before, working, after);
        }
        let _ = writeln!(self.out, "{}", RULE);
    }

    /// `<command> failed:` followed by the captured output.
    pub fn command_failed(&mut self, command: &str, output: &str) {
        let _ = self.out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = write!(self.out, "{} failed:", command);
        let _ = self.out.reset();
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "{}", output);
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    // ========================================================================
    // PRIVATE HELPERS
    // ========================================================================

    fn banner(&mut self, text: &str) {
        let _ = self.out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = write!(self.out, "{}", text);
        let _ = self.out.reset();
        let _ = writeln!(self.out);
    }

    fn diff(&mut self, shadow: &Path, before: &str, working: &Path, after: &str) {
        let changeset = Changeset::new(
            before.strip_suffix('\n').unwrap_or(before),
            after.strip_suffix('\n').unwrap_or(after),
            "\n",
        );
        if changeset.distance == 0 {
            return;
        }
        let lines = diff_lines(&changeset);
        let _ = writeln!(self.out, "--- {}", shadow.display());
        let _ = writeln!(self.out, "+++ {}", working.display());
        for (start, end) in hunks(&lines, DIFF_CONTEXT) {
            let old = count(&lines[..start], LineOp::Add);
            let new = count(&lines[..start], LineOp::Rem);
            let old_len = count(&lines[start..end], LineOp::Add);
            let new_len = count(&lines[start..end], LineOp::Rem);
            let _ = self.out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
            let _ = write!(
                self.out,
                "@@ -{} +{} @@",
                hunk_range(old, old_len),
                hunk_range(new, new_len)
            );
            let _ = self.out.reset();
            let _ = writeln!(self.out);

            for (op, line) in &lines[start..end] {
                let (marker, color) = match op {
                    LineOp::Same => (' ', None),
                    LineOp::Add => ('+', Some(Color::Green)),
                    LineOp::Rem => ('-', Some(Color::Red)),
                };
                let _ = self.out.set_color(ColorSpec::new().set_fg(color));
                let _ = write!(self.out, "{}{}", marker, line);
                let _ = self.out.reset();
                let _ = writeln!(self.out);
            }
        }
    }
}

/// Unchanged lines kept around each change in the fixes diff.
const DIFF_CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOp {
    Same,
    Add,
    Rem,
}

fn diff_lines(changeset: &Changeset) -> Vec<(LineOp, &str)> {
    changeset
        .diffs
        .iter()
        .flat_map(|diff| {
            let (op, text) = match diff {
                Difference::Same(x) => (LineOp::Same, x),
                Difference::Add(x) => (LineOp::Add, x),
                Difference::Rem(x) => (LineOp::Rem, x),
            };
            text.split('\n').map(move |line| (op, line))
        })
        .collect()
}

/// `[start, end)` index ranges into `lines`, one per hunk. Each change is
/// padded with up to `context` lines; overlapping or touching hunks merge.
fn hunks(lines: &[(LineOp, &str)], context: usize) -> Vec<(usize, usize)> {
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for (i, (op, _)) in lines.iter().enumerate() {
        if *op == LineOp::Same {
            continue;
        }
        let start = i.saturating_sub(context);
        let end = (i + context + 1).min(lines.len());
        match hunks.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => hunks.push((start, end)),
        }
    }
    hunks
}

/// Lines on one side of the diff: everything except the other side's ops.
fn count(lines: &[(LineOp, &str)], other_side: LineOp) -> usize {
    lines.iter().filter(|(op, _)| *op != other_side).count()
}

/// `start,len` for a hunk header, 1-based; an empty side points at the
/// line before it.
fn hunk_range(preceding: usize, len: usize) -> String {
    if len == 0 {
        format!("{},0", preceding)
    } else {
        format!("{},{}", preceding + 1, len)
    }
}
