//! Command-line argument definitions for `restyle`.

use std::path::PathBuf;

use clap::Parser;

/// Normalises naming and style of C# sources.
#[derive(Parser, Debug)]
#[command(name = "restyle", version)]
pub(crate) struct Cli {
    /// Reports files that would change and exits non-zero if any would.
    #[arg(long, conflicts_with = "diff")]
    pub(crate) check: bool,
    /// Prints unified diffs instead of writing files.
    #[arg(long)]
    pub(crate) diff: bool,
    /// Lists the rules in execution order and exits.
    #[arg(long)]
    pub(crate) list_rules: bool,
    /// Files or directories to process.
    #[arg(value_name = "PATH", required_unless_present = "list_rules")]
    pub(crate) paths: Vec<PathBuf>,
}

/// What to do with files whose output differs from their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Write,
    Check,
    Diff,
}

impl Cli {
    pub(crate) const fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.diff {
            Mode::Diff
        } else {
            Mode::Write
        }
    }
}
