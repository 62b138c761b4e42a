//! Error types for semantic resolution and renaming.

use restyle_syntax::{NodePath, SyntaxError};
use thiserror::Error;

use crate::program::FileId;

/// Errors from semantic operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SemanticError {
    /// The program holds no file with this identifier.
    #[error("unknown file {file}")]
    UnknownFile {
        /// The missing file.
        file: FileId,
    },

    /// No declaration exists at the given location.
    #[error("no symbol declared at {path} in file {file}")]
    UnknownSymbol {
        /// File that was searched.
        file: FileId,
        /// Path that was expected to declare a symbol.
        path: NodePath,
    },

    /// A proposed name is not a usable identifier.
    #[error("'{name}' is not a valid identifier")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A tree edit failed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl SemanticError {
    /// Creates an unknown-file error.
    #[must_use]
    pub const fn unknown_file(file: FileId) -> Self {
        Self::UnknownFile { file }
    }

    /// Creates an unknown-symbol error.
    #[must_use]
    pub fn unknown_symbol(file: FileId, path: &NodePath) -> Self {
        Self::UnknownSymbol {
            file,
            path: path.clone(),
        }
    }

    /// Creates an invalid-name error.
    #[must_use]
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }
}
