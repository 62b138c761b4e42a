//! Independent grammar check of rendered output.
//!
//! Text produced by the [`Formatter`](crate::Formatter) is parsed once more
//! with the Tree-sitter C# grammar before it reaches disk. Output that
//! grammar rejects is reported and the original file is kept.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::position::point_to_one_based;

/// Checks rendered files against the reference grammar.
///
/// Paths whose language has no bundled grammar are accepted unchecked.
/// One parser per language is built on first use and reused afterwards.
pub struct TreeSitterSyntacticLock {
    parsers: Mutex<HashMap<SupportedLanguage, tree_sitter::Parser>>,
}

impl TreeSitterSyntacticLock {
    /// Creates a lock with no parsers built yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Mutex::new(HashMap::new()),
        }
    }

    /// Returns every place the grammar rejects in `content`, ordered by
    /// position. An empty list means the text is accepted.
    ///
    /// # Errors
    ///
    /// Fails when the grammar cannot be loaded, the parser cache is
    /// poisoned, or Tree-sitter produces no tree.
    pub fn validate_file(
        &self,
        path: &Path,
        content: &str,
    ) -> Result<Vec<ValidationFailure>, SyntaxError> {
        let Some(language) = SupportedLanguage::from_path(path) else {
            return Ok(Vec::new());
        };
        let Some(grammar) = language.tree_sitter_language() else {
            return Ok(Vec::new());
        };

        let mut parsers = self
            .parsers
            .lock()
            .map_err(|_| SyntaxError::grammar(language, "parser cache poisoned"))?;
        let parser = match parsers.entry(language) {
            Entry::Occupied(cached) => cached.into_mut(),
            Entry::Vacant(slot) => {
                let mut fresh = tree_sitter::Parser::new();
                fresh
                    .set_language(&grammar)
                    .map_err(|err| SyntaxError::grammar(language, err.to_string()))?;
                slot.insert(fresh)
            }
        };
        let tree = parser
            .parse(content, None)
            .ok_or_else(|| SyntaxError::internal("tree-sitter produced no tree"))?;
        Ok(rejected_regions(tree.root_node(), path))
    }

    /// Whether [`validate_file`](Self::validate_file) checks `path` at all.
    #[must_use]
    pub fn supports_file(path: &Path) -> bool {
        SupportedLanguage::from_path(path)
            .and_then(SupportedLanguage::tree_sitter_language)
            .is_some()
    }
}

impl Default for TreeSitterSyntacticLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TreeSitterSyntacticLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSitterSyntacticLock").finish_non_exhaustive()
    }
}

/// Error and missing nodes in source order, each with a message. Only
/// subtrees that contain errors are walked, and a reported node is not
/// descended into.
pub(crate) fn rejected_nodes(root: tree_sitter::Node<'_>) -> Vec<(tree_sitter::Node<'_>, String)> {
    let mut rejected = Vec::new();
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if node.is_missing() {
            rejected.push((node, format!("missing {}", node.kind())));
        } else if node.is_error() {
            rejected.push((node, "unexpected input".to_owned()));
        } else if node.has_error() {
            let mut cursor = node.walk();
            pending.extend(node.children(&mut cursor));
        }
    }
    rejected.sort_by_key(|(node, _)| node.start_byte());
    rejected
}

fn rejected_regions(root: tree_sitter::Node<'_>, path: &Path) -> Vec<ValidationFailure> {
    rejected_nodes(root)
        .into_iter()
        .map(|(node, message)| ValidationFailure::at(path, node, message))
        .collect()
}

/// A place in rendered output the reference grammar rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// File the text was rendered for.
    pub path: PathBuf,
    /// One-based line.
    pub line: u32,
    /// One-based column.
    pub column: u32,
    /// What the grammar found.
    pub message: String,
}

impl ValidationFailure {
    fn at(path: &Path, node: tree_sitter::Node<'_>, message: String) -> Self {
        let (line, column) = point_to_one_based(node.start_position());
        Self {
            path: path.to_path_buf(),
            line,
            column,
            message,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.path.display(),
            self.line,
            self.column,
            self.message
        )
    }
}
