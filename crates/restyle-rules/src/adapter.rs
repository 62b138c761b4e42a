//! Language adapters.
//!
//! The naming and qualifier rules are written once against
//! [`LanguageAdapter`]; the registry selects the adapter for a file by its
//! [`SupportedLanguage`] tag.

use std::collections::HashMap;
use std::sync::Arc;

use restyle_semantic::{Conflict, FileId, Program, SemanticModel, SymbolId};
use restyle_syntax::{Parser, SupportedLanguage, SyntaxTree};

use crate::error::RuleError;

/// Semantic services the rules need from one language.
#[cfg_attr(test, mockall::automock)]
pub trait LanguageAdapter: Send + Sync {
    /// Language served by this adapter.
    fn language(&self) -> SupportedLanguage;

    /// Resolves `file` against the current state of `program`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Semantic`] when the file cannot be resolved.
    fn resolve(&self, program: &Program, file: FileId) -> Result<SemanticModel, RuleError>;

    /// Renames `symbol` and every reference to it across the program.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Semantic`] when the rename is rejected.
    fn rename(
        &self,
        program: &Program,
        symbol: &SymbolId,
        new_name: &str,
    ) -> Result<Program, RuleError>;

    /// Reports why renaming `symbol` to `new_name` would be unsafe, if it
    /// would.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Semantic`] when the check itself fails.
    fn find_conflict(
        &self,
        program: &Program,
        symbol: &SymbolId,
        new_name: &str,
    ) -> Result<Option<Conflict>, RuleError>;

    /// Drops redundant qualifiers from member accesses marked for
    /// simplification in `file`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Semantic`] when the file cannot be resolved.
    fn reduce_qualifications(&self, program: &Program, file: FileId)
    -> Result<Program, RuleError>;

    /// Parses `text` as a whole file.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Syntax`] when the text does not parse.
    fn parse(&self, text: &str) -> Result<SyntaxTree, RuleError>;
}

/// Adapter backed by the C# parser and semantic model.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpAdapter;

impl LanguageAdapter for CSharpAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::CSharp
    }

    fn resolve(&self, program: &Program, file: FileId) -> Result<SemanticModel, RuleError> {
        Ok(restyle_semantic::resolve(program, file)?)
    }

    fn rename(
        &self,
        program: &Program,
        symbol: &SymbolId,
        new_name: &str,
    ) -> Result<Program, RuleError> {
        Ok(restyle_semantic::rename(program, symbol, new_name)?)
    }

    fn find_conflict(
        &self,
        program: &Program,
        symbol: &SymbolId,
        new_name: &str,
    ) -> Result<Option<Conflict>, RuleError> {
        Ok(restyle_semantic::find_conflict(program, symbol, new_name)?)
    }

    fn reduce_qualifications(
        &self,
        program: &Program,
        file: FileId,
    ) -> Result<Program, RuleError> {
        Ok(restyle_semantic::reduce_qualifications(program, file)?)
    }

    fn parse(&self, text: &str) -> Result<SyntaxTree, RuleError> {
        Ok(Parser::new(SupportedLanguage::CSharp)?.parse(text)?)
    }
}

/// Adapters keyed by language.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<SupportedLanguage, Arc<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in adapter.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CSharpAdapter));
        registry
    }

    /// Registers `adapter` for its language, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn LanguageAdapter>) {
        self.adapters.insert(adapter.language(), adapter);
    }

    /// Adapter for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnsupportedLanguage`] when none is registered.
    pub fn get(&self, language: SupportedLanguage) -> Result<Arc<dyn LanguageAdapter>, RuleError> {
        self.adapters
            .get(&language)
            .cloned()
            .ok_or_else(|| RuleError::unsupported_language(language))
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<_> = self.adapters.keys().map(|l| l.as_str()).collect();
        languages.sort_unstable();
        f.debug_struct("AdapterRegistry")
            .field("languages", &languages)
            .finish()
    }
}
