//! Layered configuration for the restyle binary.
//!
//! Values are merged from built-in defaults, a `restyle.toml` file,
//! `RESTYLE_*` environment variables and command-line flags, in increasing
//! order of precedence. Loading goes through [`ortho_config`]; callers use
//! [`Config::load_from_iter`] with the flags they want the loader to see.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_INDENT_WIDTH, DEFAULT_LOG_FILTER, DEFAULT_MAX_SWEEPS, MAX_INDENT_WIDTH,
    default_indent_width, default_log_filter, default_log_filter_string, default_log_format,
    default_max_sweeps,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Command-line flags consumed by the configuration loader.
///
/// Keep in step with the fields of [`Config`]; the CLI uses this list to
/// separate configuration flags from its own arguments.
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--exclude",
    "--include",
    "--disabled-rules",
    "--max-sweeps",
    "--indent-width",
];

/// Resolved configuration shared by the CLI and the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "RESTYLE",
    discovery(
        app_name = "restyle",
        config_file_name = "restyle.toml",
        project_file_name = "restyle.toml",
        config_cli_long = "config-path",
    )
)]
pub struct Config {
    /// `tracing` filter directive, e.g. `info` or `restyle_rules=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log line format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Folder names whose files are never processed.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Folder names to restrict processing to; empty admits every folder.
    #[serde(default)]
    pub include: Vec<String>,
    /// Rule names to switch off.
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    /// Upper bound on full pipeline sweeps per run.
    #[ortho_config(default = default_max_sweeps())]
    pub max_sweeps: u32,
    /// Spaces per indentation level in rewritten files.
    #[ortho_config(default = default_indent_width())]
    pub indent_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            exclude: Vec::new(),
            include: Vec::new(),
            disabled_rules: Vec::new(),
            max_sweeps: default_max_sweeps(),
            indent_width: default_indent_width(),
        }
    }
}

impl Config {
    /// Log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log line format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Excluded folder names.
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Included folder names.
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Disabled rule names.
    #[must_use]
    pub fn disabled_rules(&self) -> &[String] {
        &self.disabled_rules
    }

    /// Sweep limit.
    #[must_use]
    pub const fn max_sweeps(&self) -> u32 {
        self.max_sweeps
    }

    /// Indentation width.
    #[must_use]
    pub const fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// Checks ranges that the loader cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the sweep limit is zero or the
    /// indentation width is zero or larger than [`MAX_INDENT_WIDTH`].
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sweeps == 0 {
            return Err(ConfigError::ZeroSweeps);
        }
        if self.indent_width == 0 || self.indent_width > MAX_INDENT_WIDTH {
            return Err(ConfigError::IndentWidth {
                width: self.indent_width,
            });
        }
        Ok(())
    }
}

/// Values that parse but make no sense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `max_sweeps` must allow at least one sweep.
    #[error("max_sweeps must be at least 1")]
    ZeroSweeps,
    /// `indent_width` is outside `1..=MAX_INDENT_WIDTH`.
    #[error("indent_width must be between 1 and {MAX_INDENT_WIDTH}, got {width}")]
    IndentWidth {
        /// The rejected width.
        width: usize,
    },
}
