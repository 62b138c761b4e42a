//! Mandatory braces around control statement bodies.

use restyle_syntax::{NodePath, SyntaxKind, SyntaxNode, SyntaxTree};
use tracing::debug;

use crate::error::RuleError;
use crate::rule::{RuleDescriptor, RuleOutcome, SyntaxRule};

/// Wraps single-statement bodies of `if`, `else`, `for`, `foreach`, `while`
/// and `do` in a block.
///
/// An `else` followed directly by `if` is left as a chain; the chained `if`
/// gets its own braces instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracesAlways;

impl BracesAlways {
    /// Rule name used in configuration.
    pub const NAME: &'static str = "BracesAlways";
}

impl SyntaxRule for BracesAlways {
    fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            name: Self::NAME,
            description: "Control statement bodies are always blocks",
            order: 1,
        }
    }

    fn apply(&self, tree: &SyntaxTree) -> Result<RuleOutcome<SyntaxTree>, RuleError> {
        let mut current = tree.clone();
        let mut rewrites = 0_usize;
        while let Some(site) = first_unbraced_body(&current) {
            current = current.update(&site, |body| Ok(wrap_in_block(body)))?;
            rewrites += 1;
        }
        if rewrites == 0 {
            return Ok(RuleOutcome::Unchanged);
        }
        debug!(rewrites, "wrapped statement bodies in blocks");
        Ok(RuleOutcome::Changed(current))
    }
}

/// Path of the first body, in document order, that needs braces.
fn first_unbraced_body(tree: &SyntaxTree) -> Option<NodePath> {
    tree.descendants().into_iter().find_map(|(path, node)| {
        let slot = body_slot(node)?;
        let body = node.child(slot)?;
        needs_braces(node.kind(), body).then(|| path.child(slot))
    })
}

/// Child index of the embedded statement owned by `node`.
fn body_slot(node: &SyntaxNode) -> Option<usize> {
    match node.kind() {
        SyntaxKind::IfStatement | SyntaxKind::WhileStatement => Some(1),
        SyntaxKind::ElseClause | SyntaxKind::DoStatement => Some(0),
        SyntaxKind::ForStatement | SyntaxKind::ForEachStatement => Some(3),
        _ => None,
    }
}

fn needs_braces(owner: SyntaxKind, body: &SyntaxNode) -> bool {
    match body.kind() {
        SyntaxKind::Block => false,
        SyntaxKind::IfStatement => owner != SyntaxKind::ElseClause,
        kind => kind.is_statement(),
    }
}

fn wrap_in_block(body: &SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(SyntaxKind::Block).with_child(body.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use restyle_syntax::{Formatter, Parser, SupportedLanguage};
    use rstest::rstest;

    fn parse(source: &str) -> SyntaxTree {
        Parser::new(SupportedLanguage::CSharp)
            .expect("parser")
            .parse(source)
            .expect("parse")
    }

    fn braced(source: &str) -> String {
        let tree = parse(source);
        let out = BracesAlways.apply(&tree).expect("apply").latest(tree);
        Formatter::default().apply_layout(&out)
    }

    #[test]
    fn wraps_an_if_body() {
        let out = braced("class A { void M(bool x) { if (x) Run(); } }");
        assert!(
            out.contains("if (x)\n        {\n            Run();\n        }"),
            "{out}"
        );
    }

    #[test]
    fn braces_every_link_of_an_else_if_chain() {
        let out = braced(
            "class A { void M(int x) { if (x == 1) One(); else if (x == 2) Two(); else Other(); } }",
        );
        assert!(out.contains("else if (x == 2)"), "{out}");
        assert_eq!(out.matches('{').count(), 5, "{out}");
    }

    #[rstest]
    #[case("class A { void M(int[] xs) { foreach (var x in xs) Use(x); } }")]
    #[case("class A { void M() { for (int i = 0; i < 3; i++) Use(i); } }")]
    #[case("class A { void M(bool x) { while (x) x = Step(); } }")]
    #[case("class A { void M(bool x) { do x = Step(); while (x); } }")]
    fn wraps_loop_bodies(#[case] source: &str) {
        let tree = parse(source);
        let outcome = BracesAlways.apply(&tree).expect("apply");
        let RuleOutcome::Changed(out) = outcome else {
            panic!("expected a rewrite");
        };
        assert_eq!(out.paths_of_kind(SyntaxKind::Block).len(), 2);
    }

    #[test]
    fn nested_bodies_reach_a_fixed_point() {
        let tree = parse("class A { void M(bool x) { if (x) while (x) if (x) x = false; } }");
        let out = BracesAlways.apply(&tree).expect("apply").latest(tree);
        assert_eq!(out.paths_of_kind(SyntaxKind::Block).len(), 4);
        assert_eq!(BracesAlways.apply(&out).expect("apply"), RuleOutcome::Unchanged);
    }

    #[test]
    fn already_braced_bodies_are_untouched() {
        let tree = parse("class A { void M(bool x) { if (x) { Run(); } else { Stop(); } } }");
        assert_eq!(BracesAlways.apply(&tree).expect("apply"), RuleOutcome::Unchanged);
    }
}
