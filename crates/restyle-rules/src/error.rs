//! Error types for the rule engine.

use std::path::PathBuf;

use restyle_semantic::SemanticError;
use restyle_syntax::{SupportedLanguage, SyntaxError};
use thiserror::Error;

/// Errors raised while applying rules to a file.
///
/// Every variant is fatal for the file being processed only; the
/// coordinator records it and moves on to the next file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuleError {
    /// No language adapter is registered for the file's language.
    #[error("no rules are implemented for {language} sources")]
    UnsupportedLanguage {
        /// The language that was requested.
        language: SupportedLanguage,
    },

    /// A rewrite produced a tree that no longer parses.
    #[error("rewriting {path} produced malformed source: {source}")]
    MalformedTree {
        /// File whose tree was rewritten.
        path: PathBuf,
        /// Parse failure reported for the rendered output.
        #[source]
        source: SyntaxError,
    },

    /// A marker outlived the batch that created it.
    #[error("rule {rule} left a marker behind in {path}")]
    ResidualMarker {
        /// Rule that minted the marker.
        rule: &'static str,
        /// File still carrying the marker.
        path: PathBuf,
    },

    /// A syntax rule kept changing the file until the pass limit.
    #[error("rule {rule} did not settle on {path} after {passes} passes")]
    Unsettled {
        /// Rule that kept changing the file.
        rule: &'static str,
        /// File being rewritten.
        path: PathBuf,
        /// Passes performed.
        passes: usize,
    },

    /// Semantic resolution or renaming failed.
    #[error(transparent)]
    Semantic(#[from] SemanticError),

    /// A tree edit failed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl RuleError {
    /// Creates an unsupported-language error.
    #[must_use]
    pub const fn unsupported_language(language: SupportedLanguage) -> Self {
        Self::UnsupportedLanguage { language }
    }

    /// Creates a malformed-tree error.
    #[must_use]
    pub fn malformed_tree(path: impl Into<PathBuf>, source: SyntaxError) -> Self {
        Self::MalformedTree {
            path: path.into(),
            source,
        }
    }

    /// Creates a residual-marker error.
    #[must_use]
    pub fn residual_marker(rule: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::ResidualMarker {
            rule,
            path: path.into(),
        }
    }

    /// Creates an unsettled-rule error.
    #[must_use]
    pub fn unsettled(rule: &'static str, path: impl Into<PathBuf>, passes: usize) -> Self {
        Self::Unsettled {
            rule,
            path: path.into(),
            passes,
        }
    }
}
