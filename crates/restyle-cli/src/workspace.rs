//! Loading discovered files into a [`Program`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use restyle_semantic::{Program, SourceFile};
use tracing::debug;

use crate::AppError;

/// The parsed program plus the text each file was read from.
#[derive(Debug)]
pub(crate) struct Workspace {
    program: Program,
    originals: HashMap<PathBuf, String>,
}

impl Workspace {
    /// Reads and parses `paths`. Files that cannot be read or parsed are
    /// returned as errors and left out of the program.
    pub(crate) fn load(paths: &[PathBuf]) -> (Self, Vec<AppError>) {
        let mut sources = Vec::new();
        let mut originals = HashMap::new();
        let mut errors = Vec::new();
        for path in paths {
            match read_source(path) {
                Ok((source, text)) => {
                    debug!(path = %path.display(), "parsed");
                    sources.push(source);
                    originals.insert(path.clone(), text);
                }
                Err(error) => errors.push(error),
            }
        }
        let workspace = Self {
            program: Program::new(sources),
            originals,
        };
        (workspace, errors)
    }

    pub(crate) const fn program(&self) -> &Program {
        &self.program
    }

    /// Text `path` held before the run.
    pub(crate) fn original(&self, path: &Path) -> Option<&str> {
        self.originals.get(path).map(String::as_str)
    }
}

fn read_source(path: &Path) -> Result<(SourceFile, String), AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let source = SourceFile::parse(path, &text).map_err(|source| AppError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((source, text))
}
