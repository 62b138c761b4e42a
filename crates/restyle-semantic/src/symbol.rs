//! Symbols: identities of named declarations.

use std::fmt;

use restyle_syntax::{DeclarationKind, Modifiers, NodePath, SyntaxKind};

use crate::program::FileId;

/// Kind of a symbol.
pub type SymbolKind = DeclarationKind;

/// Identity of a declaration: the file and path of its declaring node.
///
/// Renames only change tokens, so a symbol keeps its identity across every
/// program version produced by renaming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId {
    file: FileId,
    path: NodePath,
}

impl SymbolId {
    /// Creates a symbol identity.
    #[must_use]
    pub const fn new(file: FileId, path: NodePath) -> Self {
        Self { file, path }
    }

    /// Declaring file.
    #[must_use]
    pub const fn file(&self) -> FileId {
        self.file
    }

    /// Path of the declaring node.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file, self.path)
    }
}

/// Fully qualified name of a type, such as `Game.Player.Stats`.
///
/// All partial declarations of a type share one `TypeId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(String);

impl TypeId {
    /// Wraps a qualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Qualified name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of a type nested in this one.
    #[must_use]
    pub fn nested(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved named declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub(crate) id: SymbolId,
    pub(crate) kind: SymbolKind,
    pub(crate) name: String,
    pub(crate) containing_type: Option<TypeId>,
    pub(crate) container_kind: Option<SyntaxKind>,
    pub(crate) declared_type: Option<String>,
    pub(crate) modifiers: Modifiers,
    pub(crate) parameter_count: Option<usize>,
}

impl Symbol {
    /// Identity of the declaration.
    #[must_use]
    pub const fn id(&self) -> &SymbolId {
        &self.id
    }

    /// Symbol kind.
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Current name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type declaring the symbol; `None` for top-level types.
    ///
    /// For locals and parameters this is the type whose member body declares
    /// them.
    #[must_use]
    pub const fn containing_type(&self) -> Option<&TypeId> {
        self.containing_type.as_ref()
    }

    /// Kind of the containing type declaration (class, struct, interface or
    /// enum).
    #[must_use]
    pub const fn container_kind(&self) -> Option<SyntaxKind> {
        self.container_kind
    }

    /// Declared type text, or the return type for methods.
    #[must_use]
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    /// Modifiers and attributes of the declaration.
    #[must_use]
    pub const fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Parameter count for methods.
    #[must_use]
    pub const fn parameter_count(&self) -> Option<usize> {
        self.parameter_count
    }

    /// Returns whether the symbol is a type member rather than a local,
    /// parameter or type.
    #[must_use]
    pub const fn is_member(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Field
                | SymbolKind::Property
                | SymbolKind::Method
                | SymbolKind::EnumMember
                | SymbolKind::OtherMember
        )
    }
}
