//! Minimal-qualification reducer.
//!
//! Member accesses tagged with [`Annotation::Simplify`] lose their qualifier
//! when the qualifier is `this` or a type name and the bare member name binds
//! to the same symbol at that site. Every `Simplify` tag is removed
//! afterwards, whether or not the access could be reduced.

use restyle_syntax::{Annotation, NodePath, SyntaxKind, SyntaxNode};
use tracing::debug;

use crate::error::SemanticError;
use crate::model::{SemanticModel, resolve};
use crate::program::{FileId, Program};
use crate::symbol::SymbolKind;

const fn is_simplify(annotation: &Annotation) -> bool {
    matches!(annotation, Annotation::Simplify)
}

/// Reduces `Simplify`-tagged member accesses in `file`.
///
/// Returns the receiver unchanged when the file carries no tags.
///
/// # Errors
///
/// Returns [`SemanticError::UnknownFile`] if `file` is not part of the
/// program.
pub fn reduce_qualifications(program: &Program, file: FileId) -> Result<Program, SemanticError> {
    let tree = program.file(file)?.tree().clone();
    let requested = tree.find_annotated(is_simplify);
    if requested.is_empty() {
        return Ok(program.clone());
    }
    let model = resolve(program, file)?;
    let reducible: Vec<&NodePath> = requested
        .iter()
        .filter(|path| is_reducible(&model, path))
        .collect();
    debug!(
        %file,
        requested = requested.len(),
        reduced = reducible.len(),
        "reducing qualifications"
    );

    let mut reduced = tree;
    for path in reducible.into_iter().rev() {
        reduced = reduced.update(path, |node| Ok(unqualified(node)))?;
    }
    program.with_tree(file, reduced.without_annotations(is_simplify))
}

fn is_reducible(model: &SemanticModel, path: &NodePath) -> bool {
    let Some(node) = model.tree().node_at(path) else {
        return false;
    };
    let (Some(name), Some(qualifier)) = (node.token(), node.child(0)) else {
        return false;
    };
    if node.kind() != SyntaxKind::MemberAccess {
        return false;
    }
    let qualifier_is_removable = match qualifier.kind() {
        SyntaxKind::ThisExpression => true,
        SyntaxKind::IdentifierName => model
            .symbol_of(&path.child(0))
            .is_some_and(|symbol| symbol.kind() == SymbolKind::Type),
        _ => false,
    };
    if !qualifier_is_removable {
        return false;
    }
    let Some(bound) = model.binding(path) else {
        return false;
    };
    model
        .lookup(path, name)
        .is_some_and(|bare| bare.id() == bound)
}

fn unqualified(node: &SyntaxNode) -> SyntaxNode {
    let mut trivia = node.trivia().clone();
    if let Some(qualifier) = node.child(0) {
        let mut leading = qualifier.trivia().leading.clone();
        leading.append(&mut trivia.leading);
        trivia.leading = leading;
    }
    let mut bare = SyntaxNode::new(SyntaxKind::IdentifierName)
        .with_optional_token(node.token().map(str::to_owned))
        .with_children(
            node.children_of_kind(SyntaxKind::TypeArgumentList)
                .cloned()
                .collect(),
        )
        .with_trivia(trivia);
    for annotation in node.annotations() {
        bare = bare.with_annotation(annotation.clone());
    }
    bare
}
