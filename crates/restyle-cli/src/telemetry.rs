//! Diagnostic logging for a restyle run.
//!
//! Log lines go to stderr so they never mix with diffs or file lists on
//! stdout. The subscriber is process-wide and installed at most once.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use restyle_config::{Config, LogFormat};
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

static INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
pub(crate) enum TelemetryError {
    #[error("invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs logging for `config` unless a previous call already did.
pub(crate) fn initialise(config: &Config) -> Result<(), TelemetryError> {
    INSTALLED.get_or_try_init(|| install(config)).map(|_| ())
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|error| TelemetryError::Filter {
        directive: directive.to_owned(),
        reason: error.to_string(),
    })
}

fn output_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());
    match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
    }
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let subscriber = Registry::default()
        .with(output_layer(config.log_format()))
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
