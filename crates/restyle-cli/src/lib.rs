//! Command-line runtime for restyle.
//!
//! The runtime splits configuration flags from command arguments, loads
//! configuration, discovers source files, runs the rule pipeline over them
//! and then writes, checks or diffs the rendered output. Configuration
//! loading and IO streams can be substituted so tests drive the same code
//! path as the binary.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use restyle_config::Config;
use restyle_rules::{Coordinator, FileSelector, PipelineOptions, PipelineReport};
use restyle_syntax::LayoutOptions;
use tracing::warn;

mod cli;
mod config;
mod discovery;
mod emit;
mod errors;
mod telemetry;
mod workspace;

use cli::{Cli, Mode};
use config::{ConfigLoader, OrthoConfigLoader, command_arguments, split_config_arguments};
use discovery::discover;
use emit::Emitter;
pub(crate) use errors::AppError;
use workspace::Workspace;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(command_arguments(&args, &split)) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            let _ = write!(io.stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report_fatal(io, &AppError::CliUsage(error)),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| execute(&cli, &config, io));
    match result {
        Ok(exit_code) => exit_code,
        Err(error) => report_fatal(io, &error),
    }
}

fn report_fatal<W: Write, E: Write>(io: &mut IoStreams<'_, W, E>, error: &AppError) -> ExitCode {
    let _ = writeln!(io.stderr, "{error}");
    ExitCode::FAILURE
}

fn execute<W: Write, E: Write>(
    cli: &Cli,
    config: &Config,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError> {
    if let Err(error) = telemetry::initialise(config) {
        writeln!(io.stderr, "warning: {error}")?;
    }

    if cli.list_rules {
        list_rules(&Coordinator::builtin(pipeline_options(config, false)), io.stdout)?;
        return Ok(ExitCode::SUCCESS);
    }

    let selector = FileSelector::new(config.include().to_vec(), config.exclude().to_vec());
    let paths = discover(&cli.paths, &selector)?;
    let (workspace, load_errors) = Workspace::load(&paths);
    let mut failed = load_errors.len();
    for error in &load_errors {
        writeln!(io.stderr, "{error}")?;
    }
    if failed > 0 {
        writeln!(
            io.stderr,
            "warning: {failed} file(s) failed to load; only symbols private to one file are renamed"
        )?;
    }

    let coordinator = Coordinator::builtin(pipeline_options(config, failed > 0));
    warn_unknown_rules(&coordinator, config);

    let report = coordinator.process(workspace.program().clone());
    failed += report.failures.len();
    write_report(&report, io.stderr)?;

    let summary = Emitter::new(cli.mode(), config.indent_width()).emit(
        &workspace,
        &report.program,
        io.stdout,
    )?;
    failed += summary.errors.len();
    for error in &summary.errors {
        writeln!(io.stderr, "{error}")?;
    }

    let changed = summary.changed.len();
    match cli.mode() {
        Mode::Write => writeln!(io.stderr, "{changed} file(s) restyled")?,
        Mode::Check if changed > 0 => writeln!(io.stderr, "{changed} file(s) would be restyled")?,
        Mode::Check | Mode::Diff => {}
    }

    let would_change = cli.mode() == Mode::Check && changed > 0;
    if failed > 0 || would_change {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn pipeline_options(config: &Config, incomplete_program: bool) -> PipelineOptions {
    PipelineOptions {
        max_sweeps: config.max_sweeps(),
        disabled_rules: config.disabled_rules().to_vec(),
        layout: LayoutOptions {
            indent_width: config.indent_width(),
            ..LayoutOptions::default()
        },
        incomplete_program,
    }
}

fn list_rules<W: Write>(coordinator: &Coordinator, stdout: &mut W) -> Result<(), AppError> {
    for (category, descriptor) in coordinator.rules() {
        writeln!(
            stdout,
            "{:<8}{:<16}{}",
            category.to_string(),
            descriptor.name,
            descriptor.description
        )?;
    }
    Ok(())
}

fn warn_unknown_rules(coordinator: &Coordinator, config: &Config) {
    let known = coordinator.rules();
    for name in config.disabled_rules() {
        if !known
            .iter()
            .any(|(_, descriptor)| descriptor.name.eq_ignore_ascii_case(name))
        {
            warn!(rule = %name, "disabled rule is not a known rule");
        }
    }
}

fn write_report<E: Write>(report: &PipelineReport, stderr: &mut E) -> Result<(), AppError> {
    for failure in &report.failures {
        writeln!(stderr, "{}: {}", failure.path.display(), failure.error)?;
    }
    for diagnostic in &report.diagnostics {
        match report.program.file(diagnostic.file) {
            Ok(file) => writeln!(stderr, "warning: {}: {diagnostic}", file.path().display())?,
            Err(_) => writeln!(stderr, "warning: {diagnostic}")?,
        }
    }
    if report.cancelled {
        writeln!(stderr, "run cancelled after {} sweep(s)", report.sweeps)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
