//! Immutable syntax trees.
//!
//! Every edit returns a new [`SyntaxTree`]; the receiver is never modified.
//! Two trees can be compared for identity with [`SyntaxTree::ptr_eq`], which
//! lets callers distinguish "returned unchanged" from "produced a new
//! version" without a structural comparison.

use std::sync::Arc;

use crate::error::SyntaxError;
use crate::node::{Annotation, NodePath, SyntaxKind, SyntaxNode};

/// An immutable syntax tree rooted at a compilation unit.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    root: Arc<SyntaxNode>,
}

impl SyntaxTree {
    /// Wraps a root node.
    #[must_use]
    pub fn new(root: SyntaxNode) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Returns whether both handles share the same root allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Node addressed by `path`.
    #[must_use]
    pub fn node_at(&self, path: &NodePath) -> Option<&SyntaxNode> {
        path.indices()
            .iter()
            .try_fold(self.root(), |node, index| node.child(*index))
    }

    /// Returns a tree in which the node at `path` is replaced by `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidPath`] if `path` addresses no node.
    pub fn replace(&self, path: &NodePath, node: SyntaxNode) -> Result<Self, SyntaxError> {
        self.update(path, |_| Ok(node))
    }

    /// Returns a tree in which the node at `path` is rewritten by `edit`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidPath`] if `path` addresses no node, or any
    /// error produced by `edit`.
    pub fn update<F>(&self, path: &NodePath, edit: F) -> Result<Self, SyntaxError>
    where
        F: FnOnce(&SyntaxNode) -> Result<SyntaxNode, SyntaxError>,
    {
        let mut root = (*self.root).clone();
        let mut cursor = &mut root;
        for index in path.indices() {
            cursor = cursor
                .children_mut()
                .get_mut(*index)
                .ok_or_else(|| SyntaxError::invalid_path(path))?;
        }
        *cursor = edit(cursor)?;
        Ok(Self::new(root))
    }

    /// Returns a tree with `annotation` attached to the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidPath`] if `path` addresses no node.
    pub fn annotate(&self, path: &NodePath, annotation: Annotation) -> Result<Self, SyntaxError> {
        self.update(path, |node| Ok(node.clone().with_annotation(annotation)))
    }

    /// All nodes with their paths, in document pre-order.
    #[must_use]
    pub fn descendants(&self) -> Vec<(NodePath, &SyntaxNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(NodePath::root(), self.root())];
        while let Some((path, node)) = stack.pop() {
            for (index, child) in node.children().iter().enumerate().rev() {
                stack.push((path.child(index), child));
            }
            out.push((path, node));
        }
        out
    }

    /// Paths of nodes of the given kind, in document order.
    #[must_use]
    pub fn paths_of_kind(&self, kind: SyntaxKind) -> Vec<NodePath> {
        self.descendants()
            .into_iter()
            .filter(|(_, node)| node.kind() == kind)
            .map(|(path, _)| path)
            .collect()
    }

    /// Paths of nodes carrying an annotation that satisfies `predicate`.
    #[must_use]
    pub fn find_annotated(&self, predicate: impl Fn(&Annotation) -> bool) -> Vec<NodePath> {
        self.descendants()
            .into_iter()
            .filter(|(_, node)| node.has_annotation(&predicate))
            .map(|(path, _)| path)
            .collect()
    }

    /// Returns whether any node carries an annotation matching `predicate`.
    #[must_use]
    pub fn has_annotation(&self, predicate: impl Fn(&Annotation) -> bool) -> bool {
        self.descendants()
            .iter()
            .any(|(_, node)| node.has_annotation(&predicate))
    }

    /// Returns a tree with every annotation matching `predicate` removed.
    ///
    /// The receiver is returned as-is (same allocation) when nothing matches.
    #[must_use]
    pub fn without_annotations(&self, predicate: impl Fn(&Annotation) -> bool) -> Self {
        if !self.has_annotation(&predicate) {
            return self.clone();
        }
        let mut root = (*self.root).clone();
        strip(&mut root, &predicate);
        Self::new(root)
    }

    /// Nearest proper ancestor of `path` whose kind satisfies `predicate`.
    #[must_use]
    pub fn ancestor_where(
        &self,
        path: &NodePath,
        predicate: impl Fn(SyntaxKind) -> bool,
    ) -> Option<(NodePath, &SyntaxNode)> {
        path.ancestors().find_map(|ancestor| {
            let node = self.node_at(&ancestor)?;
            predicate(node.kind()).then_some((ancestor, node))
        })
    }
}

impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.root == other.root
    }
}

impl Eq for SyntaxTree {}

fn strip(node: &mut SyntaxNode, predicate: &impl Fn(&Annotation) -> bool) {
    node.retain_annotations(|annotation| !predicate(annotation));
    for child in node.children_mut() {
        strip(child, predicate);
    }
}
