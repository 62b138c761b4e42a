use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use restyle_config::{Config, default_log_filter, default_log_format, default_max_sweeps};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    temp_dir: TempDir,
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<String>>,
    _env_guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let env_guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            cli_args: RefCell::new(vec![OsString::from("restyle")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
            _env_guard: env_guard,
        }
    }

    fn write_config(&self, toml: &str) {
        let path = self.temp_dir.path().join("restyle.toml");
        if let Err(error) = fs::write(&path, toml) {
            panic!("failed to write configuration: {error}");
        }

        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from("--config-path"));
        args.push(path.into_os_string());
    }

    fn set_env(&self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` on edition 2024. The harness holds
        // the environment lock and restores overrides in `Drop`.
        unsafe { std::env::set_var(key, value) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }

        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => {
                *self.loaded.borrow_mut() = Some(config);
            }
            Err(error) => {
                *self.error.borrow_mut() = Some(error.to_string());
            }
        }
    }

    fn loaded(&self) -> Config {
        self.load();
        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }
        match self.loaded.borrow().as_ref() {
            Some(config) => config.clone(),
            None => panic!("configuration was not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            if let Some(os_value) = value {
                unsafe { std::env::set_var(&key, os_value) };
            } else {
                unsafe { std::env::remove_var(&key) };
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

// ===== Given Steps =====

#[given("a configuration file setting max sweeps to {count}")]
fn given_configuration_file(harness: &Harness, count: u32) {
    harness.write_config(&format!("max_sweeps = {count}\n"));
}

#[given("a configuration file disabling the rule {rule}")]
fn given_disabled_rule(harness: &Harness, rule: String) {
    harness.write_config(&format!("disabled_rules = [\"{rule}\"]\n"));
}

#[given("the environment overrides max sweeps to {count}")]
fn given_environment_override(harness: &Harness, count: u32) {
    harness.set_env("RESTYLE_MAX_SWEEPS", &count.to_string());
}

// ===== When Steps =====

#[when("the CLI sets max sweeps to {count}")]
fn when_cli_override(harness: &Harness, count: u32) {
    harness.push_cli_arg("--max-sweeps");
    harness.push_cli_arg(count.to_string());
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

// ===== Then Steps =====

#[then("loading the configuration resolves max sweeps to {count}")]
fn then_resolved_sweeps(harness: &Harness, count: u32) {
    assert_eq!(harness.loaded().max_sweeps(), count);
}

#[then("loading the configuration disables the rule {rule}")]
fn then_rule_disabled(harness: &Harness, rule: String) {
    assert_eq!(harness.loaded().disabled_rules(), [rule]);
}

#[then("loading the configuration applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let config = harness.loaded();
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
    assert_eq!(config.max_sweeps(), default_max_sweeps());
    assert!(config.exclude().is_empty());
    assert!(config.include().is_empty());
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Defaults apply without overrides"
)]
fn defaults_apply(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "A configuration file sets the sweep limit"
)]
fn file_sets_sweeps(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The environment overrides the configuration file"
)]
fn environment_overrides_file(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The CLI overrides the environment"
)]
fn cli_overrides_environment(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Disabled rules come from the configuration file"
)]
fn file_disables_rules(#[from(harness)] harness: Harness) {
    let _ = harness;
}
