//! Syntax layer for the restyle toolchain.
//!
//! This crate owns everything that works on source text without symbol
//! resolution:
//!
//! - **Parsing** of C# source into an immutable [`SyntaxTree`], built from the
//!   Tree-sitter C# syntax tree
//!   via [`Parser`]
//! - **Annotations** ([`Annotation`]) used by the rule engine to mark nodes
//!   across tree versions
//! - **Layout** via [`Formatter`], which renders a tree back to source in
//!   Allman style
//! - **Syntactic validation** via [`TreeSitterSyntacticLock`], which checks
//!   rendered output against the reference grammar before it is written
//!
//! # Supported Languages
//!
//! - C# (`.cs`) is parsed, rewritten and validated.
//! - Visual Basic (`.vb`) is recognised so it can be reported as unsupported.
//!
//! # Example
//!
//! ```
//! use restyle_syntax::{Formatter, LayoutOptions, Parser, SupportedLanguage};
//!
//! let parser = Parser::new(SupportedLanguage::CSharp)?;
//! let tree = parser.parse("class A { void Run() { if (ok) Go(); } }")?;
//! let text = Formatter::new(LayoutOptions::default()).apply_layout(&tree);
//! assert!(text.contains("class A\n{"));
//! # Ok::<(), restyle_syntax::SyntaxError>(())
//! ```

mod declarations;
mod error;
mod keywords;
mod language;
mod node;
mod parser;
mod position;
mod printer;
mod syntactic_lock;
mod tree;

pub use declarations::{
    Accessibility, DeclarationKind, Modifiers, declaration_kind, modifier_owner, parameter_count,
};
pub use error::SyntaxError;
pub use keywords::{is_predefined_type, is_reserved_keyword, is_valid_identifier};
pub use language::SupportedLanguage;
pub use node::{Annotation, BatchId, Marker, NodePath, SyntaxKind, SyntaxNode, Trivia};
pub use parser::Parser;
pub use printer::{Formatter, LayoutOptions};
pub use syntactic_lock::{TreeSitterSyntacticLock, ValidationFailure};
pub use tree::SyntaxTree;

#[cfg(test)]
mod tests;
