//! Whole-program rename and rename conflict detection.

use std::fmt;

use restyle_syntax::{Annotation, NodePath, SyntaxKind, SyntaxNode, SyntaxTree, is_valid_identifier};
use tracing::debug;

use crate::error::SemanticError;
use crate::model::{SemanticModel, resolve};
use crate::program::{FileId, Program};
use crate::symbol::{Symbol, SymbolId, SymbolKind};

/// Renames `symbol` and every reference bound to it, in every file.
///
/// Rewritten nodes are tagged with [`Annotation::RenameBookkeeping`]; the
/// caller strips those tags once it has finished with the new version.
///
/// # Errors
///
/// Returns [`SemanticError::InvalidName`] when `new_name` is not a valid
/// identifier or is a reserved keyword, and [`SemanticError::UnknownSymbol`]
/// when nothing is declared at the symbol's location.
pub fn rename(program: &Program, symbol: &SymbolId, new_name: &str) -> Result<Program, SemanticError> {
    if !is_valid_identifier(new_name) {
        return Err(SemanticError::invalid_name(new_name));
    }
    let declaring = resolve(program, symbol.file())?;
    let target = declaring
        .symbol(symbol)
        .ok_or_else(|| SemanticError::unknown_symbol(symbol.file(), symbol.path()))?;
    debug!(symbol = %symbol, from = target.name(), to = new_name, "renaming symbol");

    let mut next = program.clone();
    for file in rename_scope(program, target) {
        let mut sites = if file == symbol.file() {
            declaring.references_to(symbol)
        } else {
            resolve(program, file)?.references_to(symbol)
        };
        if file == symbol.file() {
            sites.push(symbol.path().clone());
        }
        if sites.is_empty() {
            continue;
        }
        let mut tree = program.file(file)?.tree().clone();
        for site in &sites {
            tree = tree.update(site, |node| {
                Ok(node
                    .renamed(new_name)
                    .with_annotation(Annotation::RenameBookkeeping))
            })?;
        }
        debug!(%file, sites = sites.len(), "rewrote references");
        next = next.with_tree(file, tree)?;
    }
    Ok(next)
}

/// Files that can reference `symbol`: its own file for locals and
/// parameters, every file otherwise.
fn rename_scope(program: &Program, symbol: &Symbol) -> Vec<FileId> {
    match symbol.kind() {
        SymbolKind::Local | SymbolKind::Parameter => vec![symbol.id().file()],
        _ => program.file_ids(),
    }
}

/// Why a proposed rename is unsafe.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictReason {
    /// Another member of the same type already has the name.
    DuplicateMember {
        /// The existing member.
        existing: SymbolId,
    },
    /// Another local or parameter of the same member body has the name.
    DuplicateLocal {
        /// The existing local or parameter.
        existing: SymbolId,
    },
    /// Members cannot share the name of their containing type.
    ContainingTypeName,
    /// A reference to another symbol would bind to the renamed symbol.
    CapturedReference {
        /// File of the reference.
        file: FileId,
        /// Path of the reference.
        path: NodePath,
    },
    /// A reference to the renamed symbol would bind elsewhere.
    LostReference {
        /// File of the reference.
        file: FileId,
        /// Path of the reference.
        path: NodePath,
    },
    /// A named argument uses the current name as its label. Labels are not
    /// bound to the parameter or member they name.
    NamedArgument {
        /// File of the argument.
        file: FileId,
        /// Path of the argument.
        path: NodePath,
    },
    /// Text kept as written mentions the current name, in a position such as
    /// a property pattern or a `with` initializer that is not bound.
    TextualReference {
        /// File of the text.
        file: FileId,
        /// Path of the text run.
        path: NodePath,
    },
}

/// A rename that would change program meaning or fail to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Symbol whose rename was checked.
    pub symbol: SymbolId,
    /// Proposed name.
    pub name: String,
    /// What goes wrong.
    pub reason: ConflictReason,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renaming {} to '{}' ", self.symbol, self.name)?;
        match &self.reason {
            ConflictReason::DuplicateMember { existing } => {
                write!(f, "collides with the member declared at {existing}")
            }
            ConflictReason::DuplicateLocal { existing } => {
                write!(f, "collides with the local declared at {existing}")
            }
            ConflictReason::ContainingTypeName => f.write_str("matches its containing type"),
            ConflictReason::CapturedReference { file, path } => {
                write!(f, "captures the reference at {file}{path}")
            }
            ConflictReason::LostReference { file, path } => {
                write!(f, "loses the reference at {file}{path}")
            }
            ConflictReason::NamedArgument { file, path } => {
                write!(f, "breaks the named argument at {file}{path}")
            }
            ConflictReason::TextualReference { file, path } => {
                write!(f, "misses the unbound mention at {file}{path}")
            }
        }
    }
}

/// Checks whether renaming `symbol` to `new_name` is safe.
///
/// The declaration space of the symbol must not already hold the name, and
/// no named argument or kept text may mention the current name where it is
/// not bound. Then a trial rename is resolved again and every reference must
/// bind exactly as before: references to the symbol still reach it, and no
/// other reference is captured by it.
///
/// # Errors
///
/// Returns the errors of [`rename`] and [`resolve`].
pub fn find_conflict(
    program: &Program,
    symbol: &SymbolId,
    new_name: &str,
) -> Result<Option<Conflict>, SemanticError> {
    let declaring = resolve(program, symbol.file())?;
    let target = declaring
        .symbol(symbol)
        .cloned()
        .ok_or_else(|| SemanticError::unknown_symbol(symbol.file(), symbol.path()))?;
    let conflict = |reason| Conflict {
        symbol: symbol.clone(),
        name: new_name.to_owned(),
        reason,
    };

    if let Some(reason) = declaration_clash(&declaring, &target, new_name) {
        return Ok(Some(conflict(reason)));
    }
    if let Some(reason) = unbound_mention(program, &declaring, &target)? {
        return Ok(Some(conflict(reason)));
    }

    let trial = rename(program, symbol, new_name)?;
    for file in rename_scope(program, &target) {
        let before = if file == symbol.file() {
            declaring.clone()
        } else {
            resolve(program, file)?
        };
        let after = resolve(&trial, file)?;
        if let Some(reason) = binding_change(&before, &after, symbol) {
            return Ok(Some(conflict(reason)));
        }
    }
    Ok(None)
}

fn declaration_clash(model: &SemanticModel, target: &Symbol, new_name: &str) -> Option<ConflictReason> {
    if target.is_member() {
        let owner = target.containing_type()?;
        if model.type_name(owner) == Some(new_name) {
            return Some(ConflictReason::ContainingTypeName);
        }
        return model
            .members_named(owner, new_name)
            .find(|other| {
                other.id() != target.id()
                    && !(other.kind() == SymbolKind::Method
                        && target.kind() == SymbolKind::Method
                        && other.parameter_count() != target.parameter_count())
            })
            .map(|other| ConflictReason::DuplicateMember {
                existing: other.id().clone(),
            });
    }
    if matches!(target.kind(), SymbolKind::Local | SymbolKind::Parameter) {
        let body = member_body(model.tree(), target.id().path())?;
        return model
            .locals()
            .find(|other| {
                other.id() != target.id()
                    && other.name() == new_name
                    && body.is_ancestor_of(other.id().path())
            })
            .map(|other| ConflictReason::DuplicateLocal {
                existing: other.id().clone(),
            });
    }
    None
}

/// The member declaration containing `path`: the ancestor whose parent is a
/// type declaration.
fn member_body(tree: &SyntaxTree, path: &NodePath) -> Option<NodePath> {
    path.ancestors().find(|ancestor| {
        ancestor
            .parent()
            .and_then(|parent| tree.node_at(&parent))
            .is_some_and(|parent| parent.kind().is_type_declaration())
    })
}

/// Named arguments and kept text that mention the current name of `target`
/// without being bound to anything. Parameters are matched against argument
/// labels in every file; fields and properties against attribute and
/// initializer labels. Kept text is searched in the files the rename touches,
/// and only inside the declaring member for locals and parameters.
fn unbound_mention(
    program: &Program,
    declaring: &SemanticModel,
    target: &Symbol,
) -> Result<Option<ConflictReason>, SemanticError> {
    let name = target.name();
    let label = match target.kind() {
        SymbolKind::Parameter => Some(format!("{name}:")),
        SymbolKind::Field | SymbolKind::Property => Some(format!("{name} =")),
        _ => None,
    };
    if let Some(label) = label {
        let with_keyword = format!("{label} ");
        for file in program.file_ids() {
            let tree = program.file(file)?.tree();
            let argument = tree.paths_of_kind(SyntaxKind::Argument).into_iter().find(|path| {
                tree.node_at(path)
                    .and_then(SyntaxNode::token)
                    .is_some_and(|token| token == label || token.starts_with(&with_keyword))
            });
            if let Some(path) = argument {
                return Ok(Some(ConflictReason::NamedArgument { file, path }));
            }
        }
    }

    let within = if target.is_member() {
        None
    } else {
        member_body(declaring.tree(), target.id().path())
    };
    for file in rename_scope(program, target) {
        let tree = program.file(file)?.tree();
        let text = tree
            .paths_of_kind(SyntaxKind::VerbatimText)
            .into_iter()
            .filter(|path| within.as_ref().is_none_or(|body| body.is_ancestor_of(path)))
            .find(|path| {
                tree.node_at(path)
                    .and_then(SyntaxNode::token)
                    .is_some_and(|text| mentions(text, name))
            });
        if let Some(path) = text {
            return Ok(Some(ConflictReason::TextualReference { file, path }));
        }
    }
    Ok(None)
}

/// Whether `text` contains `name` as a whole identifier.
fn mentions(text: &str, name: &str) -> bool {
    let is_identifier_char = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(name).any(|(start, _)| {
        let before = text.get(..start).and_then(|head| head.chars().next_back());
        let after = text
            .get(start + name.len()..)
            .and_then(|tail| tail.chars().next());
        !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char)
    })
}

fn binding_change(
    before: &SemanticModel,
    after: &SemanticModel,
    symbol: &SymbolId,
) -> Option<ConflictReason> {
    let file = after.file();
    let captured = after.references().find(|(path, bound)| {
        *bound == symbol && before.binding(path) != Some(symbol)
    });
    if let Some((path, _)) = captured {
        return Some(ConflictReason::CapturedReference {
            file,
            path: path.clone(),
        });
    }
    before
        .references()
        .find(|(path, bound)| *bound == symbol && after.binding(path) != Some(symbol))
        .map(|(path, _)| ConflictReason::LostReference {
            file,
            path: path.clone(),
        })
}
