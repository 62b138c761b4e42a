//! Immutable multi-file programs.
//!
//! A [`Program`] is a value: every edit returns a new version and leaves the
//! receiver untouched. Versions share unchanged files through `Arc`, and the
//! symbol index of each version is built lazily on first use.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use restyle_syntax::{Parser, SupportedLanguage, SyntaxError, SyntaxTree};

use crate::error::SemanticError;
use crate::index::ProgramIndex;

/// Identifier of a file within a program lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Wraps a raw file number.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw file number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One source file: its path, language and current syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    language: SupportedLanguage,
    tree: SyntaxTree,
}

impl SourceFile {
    /// Creates a source file from an already parsed tree.
    #[must_use]
    pub const fn new(path: PathBuf, language: SupportedLanguage, tree: SyntaxTree) -> Self {
        Self {
            path,
            language,
            tree,
        }
    }

    /// Detects the language from `path` and parses `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnknownLanguage`] for unrecognised extensions,
    /// [`SyntaxError::UnsupportedLanguage`] when the language has no parser
    /// and [`SyntaxError::Parse`] for invalid source.
    pub fn parse(path: &Path, text: &str) -> Result<Self, SyntaxError> {
        let language = SupportedLanguage::from_path(path)
            .ok_or_else(|| SyntaxError::unknown_language(path.to_path_buf()))?;
        let tree = Parser::new(language)?.parse(text)?;
        Ok(Self::new(path.to_path_buf(), language, tree))
    }

    /// File path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Language variant.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Current syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    fn with_tree(&self, tree: SyntaxTree) -> Self {
        Self {
            path: self.path.clone(),
            language: self.language,
            tree,
        }
    }
}

/// An immutable set of source files.
#[derive(Debug, Clone)]
pub struct Program {
    files: Arc<BTreeMap<FileId, SourceFile>>,
    version: u64,
    index: Arc<OnceCell<Arc<ProgramIndex>>>,
}

impl Program {
    /// Creates a program from files, numbering them in iteration order.
    #[must_use]
    pub fn new(files: impl IntoIterator<Item = SourceFile>) -> Self {
        let files = (0_u32..).map(FileId::new).zip(files).collect();
        Self::from_map(files, 0)
    }

    fn from_map(files: BTreeMap<FileId, SourceFile>, version: u64) -> Self {
        Self {
            files: Arc::new(files),
            version,
            index: Arc::new(OnceCell::new()),
        }
    }

    /// Version number; incremented by every edit that changes a tree.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns whether the program holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the file with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SemanticError::UnknownFile`] for identifiers from another
    /// program lineage.
    pub fn file(&self, id: FileId) -> Result<&SourceFile, SemanticError> {
        self.files
            .get(&id)
            .ok_or_else(|| SemanticError::unknown_file(id))
    }

    /// Identifiers of all files in ascending order.
    #[must_use]
    pub fn file_ids(&self) -> Vec<FileId> {
        self.files.keys().copied().collect()
    }

    /// All files in identifier order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files.iter().map(|(id, file)| (*id, file))
    }

    /// Returns a program in which file `id` has the given tree.
    ///
    /// Passing the file's current tree returns a clone of the receiver with
    /// the same version.
    ///
    /// # Errors
    ///
    /// Returns [`SemanticError::UnknownFile`] if `id` is not part of the
    /// program.
    pub fn with_tree(&self, id: FileId, tree: SyntaxTree) -> Result<Self, SemanticError> {
        let current = self.file(id)?;
        if current.tree.ptr_eq(&tree) {
            return Ok(self.clone());
        }
        let mut files = (*self.files).clone();
        files.insert(id, current.with_tree(tree));
        Ok(Self::from_map(files, self.version + 1))
    }

    /// Returns whether both values are the same program version.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.files, &other.files)
    }

    /// Files whose trees differ between two versions of a program.
    #[must_use]
    pub fn changed_files(old: &Self, new: &Self) -> BTreeSet<FileId> {
        if old.ptr_eq(new) {
            return BTreeSet::new();
        }
        let mut changed: BTreeSet<FileId> = new
            .files()
            .filter(|(id, file)| {
                old.files
                    .get(id)
                    .is_none_or(|before| !before.tree.ptr_eq(&file.tree))
            })
            .map(|(id, _)| id)
            .collect();
        changed.extend(old.files.keys().filter(|id| !new.files.contains_key(id)));
        changed
    }

    pub(crate) fn index(&self) -> Arc<ProgramIndex> {
        Arc::clone(
            self.index
                .get_or_init(|| Arc::new(ProgramIndex::build(self.files()))),
        )
    }
}
