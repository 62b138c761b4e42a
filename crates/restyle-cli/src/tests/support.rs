//! Harness for driving the CLI runtime against files in a temporary folder.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use restyle_config::Config;
use rstest::fixture;
use tempfile::TempDir;

use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

/// A config loader that returns a fixed configuration.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

pub(super) struct TestWorld {
    pub(super) root: TempDir,
    pub(super) config: Config,
    pub(super) stdout: Vec<u8>,
    pub(super) stderr: Vec<u8>,
    pub(super) exit_code: Option<ExitCode>,
}

impl TestWorld {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            root: TempDir::new().context("create temp dir")?,
            config: Config::default(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
        })
    }

    pub(super) fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    pub(super) fn write(&self, name: &str, text: &str) -> Result<()> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create folders")?;
        }
        fs::write(&path, text).with_context(|| format!("write {name}"))
    }

    pub(super) fn read(&self, name: &str) -> Result<String> {
        fs::read_to_string(self.path(name)).with_context(|| format!("read {name}"))
    }

    /// Runs `restyle` with `flags` followed by the temporary folder.
    pub(super) fn run(&mut self, flags: &[&str]) {
        let mut args = vec![OsString::from("restyle")];
        args.extend(flags.iter().map(OsString::from));
        args.push(self.root.path().as_os_str().to_owned());
        self.run_args(args);
    }

    pub(super) fn run_args(&mut self, args: Vec<OsString>) {
        self.stdout.clear();
        self.stderr.clear();
        let loader = StaticConfigLoader::new(self.config.clone());
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        self.exit_code = Some(run_with_loader(args, &mut io, &loader));
    }

    pub(super) fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub(super) fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub(super) fn exit_code(&self) -> ExitCode {
        self.exit_code.unwrap_or_else(|| panic!("the CLI has not run"))
    }
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new().expect("test world"))
}
