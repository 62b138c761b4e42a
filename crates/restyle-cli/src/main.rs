//! Entry point for the `restyle` binary.
//!
//! Delegates to [`restyle_cli::run`], which loads configuration, discovers
//! source files, runs the rule pipeline and writes or reports the results.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    restyle_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
