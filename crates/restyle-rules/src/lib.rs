//! Rule engine for the restyle toolchain.
//!
//! The [`Coordinator`] runs three phases over every file of a
//! [`Program`](restyle_semantic::Program):
//!
//! 1. syntax rules such as [`BracesAlways`], each repeated until it reports
//!    no change;
//! 2. local semantic rules such as [`ExplicitThis`], which resolve symbols
//!    in the current file only;
//! 3. global semantic rules, the [`naming`] conventions, which rename
//!    declarations across every file through the marker-driven protocol in
//!    [`naming::protocol`].
//!
//! Language specifics sit behind [`LanguageAdapter`]; the rules themselves
//! are written once.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use restyle_rules::{Coordinator, PipelineOptions};
//! use restyle_semantic::{Program, SourceFile};
//!
//! let file = SourceFile::parse(Path::new("A.cs"), "class A { int count; }")?;
//! let report = Coordinator::builtin(PipelineOptions::default()).process(Program::new([file]));
//! assert!(report.failures.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod adapter;
mod braces;
mod error;
pub mod naming;
mod pipeline;
mod qualifier;
mod rule;
mod selector;

pub use adapter::{AdapterRegistry, CSharpAdapter, LanguageAdapter};
pub use braces::BracesAlways;
pub use error::RuleError;
pub use pipeline::{CancellationFlag, Coordinator, FileFailure, PipelineOptions, PipelineReport};
pub use qualifier::ExplicitThis;
pub use rule::{
    BatchMinter, GlobalSemanticRule, LocalSemanticRule, RenameDiagnostic, RuleCategory,
    RuleContext, RuleDescriptor, RuleOutcome, SkipReason, SyntaxRule,
};
pub use selector::FileSelector;

#[cfg(test)]
mod tests;
