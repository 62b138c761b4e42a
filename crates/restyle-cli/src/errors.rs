//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use restyle_config::ConfigError;
use restyle_syntax::SyntaxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("{}: no such file or directory", path.display())]
    MissingPath { path: PathBuf },
    #[error("failed to walk {}: {source}", path.display())]
    Discover {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("{}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{}: {source}", path.display())]
    Parse { path: PathBuf, source: SyntaxError },
    #[error("{}: {source}", path.display())]
    Validate { path: PathBuf, source: SyntaxError },
    #[error("{}: rewritten output does not parse: {detail}", path.display())]
    Rejected { path: PathBuf, detail: String },
    #[error("{}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
