use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default number of full sweeps the pipeline may run.
pub const DEFAULT_MAX_SWEEPS: u32 = 3;

/// Default indentation width, in spaces, of rendered output.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Largest accepted indentation width.
pub const MAX_INDENT_WIDTH: usize = 16;

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default sweep limit.
#[must_use]
pub const fn default_max_sweeps() -> u32 {
    DEFAULT_MAX_SWEEPS
}

/// Default indentation width.
#[must_use]
pub const fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}
