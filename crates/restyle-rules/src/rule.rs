//! Rule traits and the context threaded through a pipeline run.

use std::fmt;
use std::sync::Arc;

use restyle_semantic::{FileId, Program, SymbolId};
use restyle_syntax::{BatchId, SyntaxTree};

use crate::adapter::{AdapterRegistry, LanguageAdapter};
use crate::error::RuleError;

/// Phase a rule belongs to. Phases run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleCategory {
    /// Tree rewrites that need no symbol information.
    Syntax,
    /// Rewrites that resolve symbols in the current file only.
    LocalSemantic,
    /// Renames applied across the whole program.
    GlobalSemantic,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Syntax => "syntax",
            Self::LocalSemantic => "local",
            Self::GlobalSemantic => "global",
        })
    }
}

/// Name, description and priority of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDescriptor {
    /// Name used to disable the rule in configuration.
    pub name: &'static str,
    /// One-line summary.
    pub description: &'static str,
    /// Priority within the rule's category; lower runs first.
    pub order: u32,
}

/// Result of applying a rule.
///
/// `Unchanged` means the input is still current; callers can skip any
/// follow-up work without comparing trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome<T> {
    /// The rule found nothing to do.
    Unchanged,
    /// The rule produced a new version.
    Changed(T),
}

impl<T> RuleOutcome<T> {
    /// Returns whether a new version was produced.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// The new version, or `current` when nothing changed.
    pub fn latest(self, current: T) -> T {
        match self {
            Self::Unchanged => current,
            Self::Changed(next) => next,
        }
    }
}

/// A rewrite of one syntax tree, applied until it reports no change.
#[cfg_attr(test, mockall::automock)]
pub trait SyntaxRule: Send + Sync {
    /// Rule metadata.
    fn descriptor(&self) -> RuleDescriptor;

    /// Applies the rule to `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Syntax`] when a tree edit fails.
    fn apply(&self, tree: &SyntaxTree) -> Result<RuleOutcome<SyntaxTree>, RuleError>;
}

/// A rewrite of one file that needs that file's semantic model.
#[cfg_attr(test, mockall::automock)]
pub trait LocalSemanticRule: Send + Sync {
    /// Rule metadata.
    fn descriptor(&self) -> RuleDescriptor;

    /// Applies the rule to `file`. Only that file may change.
    ///
    /// # Errors
    ///
    /// Returns any error raised while resolving or rewriting the file.
    fn apply(
        &self,
        context: &mut RuleContext,
        program: &Program,
        file: FileId,
    ) -> Result<RuleOutcome<Program>, RuleError>;
}

/// A rule that renames declarations of `file` across the whole program.
#[cfg_attr(test, mockall::automock)]
pub trait GlobalSemanticRule: Send + Sync {
    /// Rule metadata.
    fn descriptor(&self) -> RuleDescriptor;

    /// Applies the rule to the declarations of `file`; any file may change.
    ///
    /// # Errors
    ///
    /// Returns any error raised while resolving or renaming.
    fn apply(
        &self,
        context: &mut RuleContext,
        program: &Program,
        file: FileId,
    ) -> Result<RuleOutcome<Program>, RuleError>;
}

/// Why a rename candidate was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
    /// The marked node no longer declares a symbol.
    ResolutionFailure,
    /// The proposed name is already taken or would rebind a reference.
    NameCollision {
        /// Description of the conflict.
        detail: String,
    },
    /// The proposed name is empty or not a valid identifier.
    InvalidName,
    /// Files that failed to load may reference the symbol.
    IncompleteProgram,
}

/// A rename candidate that was skipped without failing the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDiagnostic {
    /// Rule that skipped the candidate.
    pub rule: &'static str,
    /// File whose declarations were being renamed.
    pub file: FileId,
    /// Ordinal of the candidate within its batch.
    pub ordinal: u32,
    /// Symbol, when it could still be resolved.
    pub symbol: Option<SymbolId>,
    /// Current name of the declaration.
    pub name: String,
    /// Name the rule wanted to apply.
    pub proposed: String,
    /// Why the candidate was skipped.
    pub reason: SkipReason,
}

impl fmt::Display for RenameDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.rule)?;
        match &self.reason {
            SkipReason::ResolutionFailure => {
                write!(f, "candidate {} no longer resolves", self.ordinal)
            }
            SkipReason::NameCollision { detail } => {
                write!(f, "kept '{}': {detail}", self.name)
            }
            SkipReason::InvalidName => {
                write!(f, "kept '{}': '{}' is not a valid name", self.name, self.proposed)
            }
            SkipReason::IncompleteProgram => {
                write!(f, "kept '{}': files that failed to load may use it", self.name)
            }
        }
    }
}

/// Mints marker batch identifiers for one pipeline run.
#[derive(Debug, Default)]
pub struct BatchMinter {
    next: u64,
}

impl BatchMinter {
    /// Returns a batch identifier never handed out before by this minter.
    pub fn mint(&mut self) -> BatchId {
        let batch = BatchId::new(self.next);
        self.next = self.next.wrapping_add(1);
        batch
    }
}

/// State threaded through every rule of one pipeline run.
#[derive(Debug)]
pub struct RuleContext {
    adapters: AdapterRegistry,
    minter: BatchMinter,
    diagnostics: Vec<RenameDiagnostic>,
    incomplete_program: bool,
}

impl RuleContext {
    /// Creates a context serving `adapters`.
    #[must_use]
    pub fn new(adapters: AdapterRegistry) -> Self {
        Self {
            adapters,
            minter: BatchMinter::default(),
            diagnostics: Vec::new(),
            incomplete_program: false,
        }
    }

    /// Marks the program as missing files that failed to load.
    #[must_use]
    pub const fn with_incomplete_program(mut self, incomplete: bool) -> Self {
        self.incomplete_program = incomplete;
        self
    }

    /// Whether files of the program failed to load, so symbols visible
    /// outside their file must keep their names.
    #[must_use]
    pub const fn is_incomplete_program(&self) -> bool {
        self.incomplete_program
    }

    /// Adapter for the language of `file`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnsupportedLanguage`] when the language has no
    /// adapter, or [`RuleError::Semantic`] when the file is unknown.
    pub fn adapter_for(
        &self,
        program: &Program,
        file: FileId,
    ) -> Result<Arc<dyn LanguageAdapter>, RuleError> {
        self.adapters.get(program.file(file)?.language())
    }

    /// Mints a fresh marker batch.
    pub fn mint_batch(&mut self) -> BatchId {
        self.minter.mint()
    }

    /// Records a skipped rename candidate. Repeats from later sweeps are
    /// dropped.
    pub fn report(&mut self, diagnostic: RenameDiagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[RenameDiagnostic] {
        &self.diagnostics
    }

    /// Drops diagnostics recorded after the first `len`.
    pub(crate) fn truncate_diagnostics(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<RenameDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_batches_are_distinct() {
        let mut minter = BatchMinter::default();
        let first = minter.mint();
        let second = minter.mint();
        assert_ne!(first, second);
    }

    #[test]
    fn unchanged_outcome_keeps_the_current_value() {
        assert_eq!(RuleOutcome::Unchanged.latest(3), 3);
        assert_eq!(RuleOutcome::Changed(4).latest(3), 4);
    }
}
