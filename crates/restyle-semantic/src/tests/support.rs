//! Shared helpers for semantic tests.

use std::path::Path;

use restyle_syntax::{Formatter, NodePath, SyntaxKind, SyntaxNode};

use crate::{FileId, Program, SemanticModel, SourceFile, Symbol, resolve};

/// Builds a program from `(path, source)` pairs.
pub(crate) fn program(sources: &[(&str, &str)]) -> Program {
    Program::new(
        sources
            .iter()
            .map(|(path, text)| SourceFile::parse(Path::new(path), text).expect("parse")),
    )
}

/// Resolves file `index` of `program`.
pub(crate) fn model(program: &Program, index: u32) -> SemanticModel {
    resolve(program, FileId::new(index)).expect("resolve")
}

/// Renders file `index` of `program`.
pub(crate) fn render(program: &Program, index: u32) -> String {
    let file = program.file(FileId::new(index)).expect("file");
    Formatter::default().apply_layout(file.tree())
}

/// Paths of nodes of `kind` whose token is `token`, in document order.
pub(crate) fn paths_with_token(model: &SemanticModel, kind: SyntaxKind, token: &str) -> Vec<NodePath> {
    model
        .tree()
        .paths_of_kind(kind)
        .into_iter()
        .filter(|path| model.tree().node_at(path).and_then(SyntaxNode::token) == Some(token))
        .collect()
}

/// The symbol declared with `name` and `kind` in `model`'s file.
pub(crate) fn declared(model: &SemanticModel, kind: SyntaxKind, name: &str) -> Symbol {
    paths_with_token(model, kind, name)
        .into_iter()
        .find_map(|path| model.declared_symbol(&path).cloned())
        .expect("declaration")
}
