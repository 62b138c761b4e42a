//! Errors raised while parsing, editing or validating syntax trees.

use std::path::PathBuf;

use thiserror::Error;

use crate::language::SupportedLanguage;
use crate::node::NodePath;

/// Failures of the syntax layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyntaxError {
    /// The grammar rejects the source text, or it nests deeper than the
    /// converter accepts.
    #[error("{line}:{column}: {message}")]
    Parse {
        /// One-based line of the offending token.
        line: u32,
        /// One-based column of the offending token.
        column: u32,
        /// What was expected or found.
        message: String,
    },

    /// The language is recognised but has no parser.
    #[error("{language} sources are not supported")]
    UnsupportedLanguage {
        /// The recognised language.
        language: SupportedLanguage,
    },

    /// The file extension maps to no known language.
    #[error("unrecognised source file {}", path.display())]
    UnknownLanguage {
        /// The file in question.
        path: PathBuf,
    },

    /// A node path addresses nothing in the tree it was applied to.
    #[error("no node at {path}")]
    InvalidPath {
        /// The dangling path.
        path: NodePath,
    },

    /// The validation grammar could not be loaded.
    #[error("cannot load the {language} grammar: {message}")]
    Grammar {
        /// Language whose grammar failed.
        language: SupportedLanguage,
        /// Loader message.
        message: String,
    },

    /// A broken internal invariant.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl SyntaxError {
    /// Parse failure at a one-based position.
    #[must_use]
    pub fn parse(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Recognised language without a parser.
    #[must_use]
    pub const fn unsupported_language(language: SupportedLanguage) -> Self {
        Self::UnsupportedLanguage { language }
    }

    /// Path with an unrecognised extension.
    #[must_use]
    pub const fn unknown_language(path: PathBuf) -> Self {
        Self::UnknownLanguage { path }
    }

    /// Path that addresses no node.
    #[must_use]
    pub fn invalid_path(path: &NodePath) -> Self {
        Self::InvalidPath { path: path.clone() }
    }

    /// Grammar that failed to load.
    #[must_use]
    pub fn grammar(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::Grammar {
            language,
            message: message.into(),
        }
    }

    /// Internal invariant failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
