//! Symbolic program model for the restyle toolchain.
//!
//! This crate supplies the semantic services the rule engine consumes:
//!
//! - [`Program`]: an immutable, versioned set of parsed source files
//! - [`resolve`]: per-file binding of references to [`Symbol`]s, producing a
//!   [`SemanticModel`]
//! - [`rename`]: whole-program, reference-aware rename that tags every
//!   rewritten node with a bookkeeping annotation
//! - [`find_conflict`]: checks whether a rename would collide with an
//!   existing declaration or rebind any reference
//! - [`reduce_qualifications`]: drops `this.` and type qualifiers from
//!   member accesses marked for simplification where doing so keeps the
//!   binding
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use restyle_semantic::{FileId, Program, SourceFile, rename, resolve};
//! use restyle_syntax::SyntaxKind;
//!
//! let file = SourceFile::parse(Path::new("Counter.cs"), "class Counter { int count; }")?;
//! let program = Program::new([file]);
//! let model = resolve(&program, FileId::new(0))?;
//! let field = model
//!     .tree()
//!     .paths_of_kind(SyntaxKind::VariableDeclarator)
//!     .into_iter()
//!     .find_map(|path| model.declared_symbol(&path).cloned())
//!     .ok_or("no field")?;
//! let renamed = rename(&program, field.id(), "count_")?;
//! assert_eq!(renamed.version(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod index;
mod model;
mod program;
mod rename;
mod simplify;
mod symbol;
mod type_text;

pub use error::SemanticError;
pub use model::{SemanticModel, resolve};
pub use program::{FileId, Program, SourceFile};
pub use rename::{Conflict, ConflictReason, find_conflict, rename};
pub use simplify::reduce_qualifications;
pub use symbol::{Symbol, SymbolId, SymbolKind, TypeId};

#[cfg(test)]
mod tests;
