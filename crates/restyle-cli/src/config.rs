//! Separates configuration flags from command arguments and loads
//! [`Config`] through `ortho-config`.
//!
//! Only a leading run of known configuration flags is given to the loader.
//! The first token that is not one of them, and everything after it, goes
//! to the command parser.

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use restyle_config::{CONFIG_CLI_FLAGS, Config};

use crate::AppError;

/// Source of the resolved configuration.
pub(crate) trait ConfigLoader {
    /// Builds a validated [`Config`] from the leading configuration flags,
    /// with `args[0]` as the program name.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loads configuration from defaults, files, environment and flags.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        let config =
            Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)?;
        config.validate()?;
        Ok(config)
    }
}

/// Number of tokens a configuration flag occupies, or `None` when `token`
/// is not a configuration flag.
fn config_flag_width(token: &OsString) -> Option<usize> {
    let text = token.to_str()?;
    let name = text.strip_prefix("--")?;
    let (name, inline) = name.split_once('=').map_or((name, false), |(n, _)| (n, true));
    CONFIG_CLI_FLAGS
        .iter()
        .any(|flag| flag.strip_prefix("--") == Some(name))
        .then_some(if inline { 1 } else { 2 })
}

/// The leading configuration flags, and where command arguments begin.
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut cursor = usize::from(!args.is_empty());
    while let Some(width) = args.get(cursor).and_then(config_flag_width) {
        cursor = (cursor + width).min(args.len());
    }
    ConfigArgumentSplit {
        config_arguments: args.get(..cursor).unwrap_or_default().to_vec(),
        command_start: cursor,
    }
}

/// Program name followed by the tokens after the configuration flags.
pub(crate) fn command_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.get(split.command_start..).unwrap_or_default())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", Some(1))]
    #[case("--max-sweeps", Some(2))]
    #[case("--config-path", Some(2))]
    #[case("src", None)]
    #[case("--check", None)]
    #[case("--unknown=1", None)]
    #[case("-v", None)]
    fn classifies_tokens(#[case] token: &str, #[case] expected: Option<usize>) {
        assert_eq!(config_flag_width(&OsString::from(token)), expected);
    }

    #[test]
    fn leading_configuration_flags_are_split_off() {
        let args = os_args(&[
            "restyle",
            "--max-sweeps",
            "2",
            "--log-format=json",
            "--check",
            "src",
        ]);
        let split = split_config_arguments(&args);
        assert_eq!(
            split.config_arguments,
            os_args(&["restyle", "--max-sweeps", "2", "--log-format=json"])
        );
        assert_eq!(
            command_arguments(&args, &split),
            os_args(&["restyle", "--check", "src"])
        );
    }

    #[test]
    fn flags_after_paths_stay_with_the_command() {
        let args = os_args(&["restyle", "src", "--max-sweeps", "2"]);
        let split = split_config_arguments(&args);
        assert_eq!(split.config_arguments, os_args(&["restyle"]));
        assert_eq!(command_arguments(&args, &split), args);
    }

    #[test]
    fn a_trailing_flag_without_value_goes_to_the_loader() {
        let args = os_args(&["restyle", "--indent-width"]);
        let split = split_config_arguments(&args);
        assert_eq!(split.config_arguments, args);
        assert_eq!(command_arguments(&args, &split), os_args(&["restyle"]));
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        let split = split_config_arguments(&[]);
        assert!(split.config_arguments.is_empty());
        assert!(command_arguments(&[], &split).is_empty());
    }
}
