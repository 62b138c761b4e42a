//! Shared helpers for rule engine tests.

use std::path::Path;

use restyle_semantic::{FileId, Program, SourceFile};
use restyle_syntax::{Annotation, Formatter};

/// Builds a program from `(path, source)` pairs.
pub(crate) fn program(sources: &[(&str, &str)]) -> Program {
    Program::new(
        sources
            .iter()
            .map(|(path, text)| SourceFile::parse(Path::new(path), text).expect("parse")),
    )
}

/// Renders file `index` of `program`.
pub(crate) fn render(program: &Program, index: u32) -> String {
    let file = program.file(FileId::new(index)).expect("file");
    Formatter::default().apply_layout(file.tree())
}

/// Whether any file still carries engine markers or rename bookkeeping.
pub(crate) fn has_transient_annotations(program: &Program) -> bool {
    program.files().any(|(_, file)| {
        file.tree().has_annotation(|a| {
            matches!(a, Annotation::Marker(_) | Annotation::RenameBookkeeping)
        })
    })
}
