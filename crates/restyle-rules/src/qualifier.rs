//! Redundant qualifier elision.

use restyle_semantic::{FileId, Program, SemanticModel, SymbolKind};
use restyle_syntax::{Annotation, NodePath, SyntaxKind};
use tracing::debug;

use crate::error::RuleError;
use crate::naming::TRAILING_MARKER;
use crate::rule::{LocalSemanticRule, RuleContext, RuleDescriptor, RuleOutcome};

/// Removes `this.` from accesses to marked members and type qualifiers from
/// accesses to members of the enclosing type.
///
/// The rule only decides which accesses are candidates. The adapter's
/// qualification reducer makes the edit and keeps any qualifier whose
/// removal would change what the name binds to.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitThis;

impl ExplicitThis {
    /// Rule name used in configuration.
    pub const NAME: &'static str = "ExplicitThis";
}

impl LocalSemanticRule for ExplicitThis {
    fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            name: Self::NAME,
            description: "Remove redundant this. and type qualifiers",
            order: 1,
        }
    }

    fn apply(
        &self,
        context: &mut RuleContext,
        program: &Program,
        file: FileId,
    ) -> Result<RuleOutcome<Program>, RuleError> {
        let adapter = context.adapter_for(program, file)?;
        let model = adapter.resolve(program, file)?;
        let candidates = candidates(&model);
        if candidates.is_empty() {
            return Ok(RuleOutcome::Unchanged);
        }

        let original = model.tree();
        let mut marked = original.clone();
        for path in &candidates {
            marked = marked.annotate(path, Annotation::Simplify)?;
        }
        let reduced = adapter.reduce_qualifications(&program.with_tree(file, marked)?, file)?;
        if reduced.file(file)?.tree() == original {
            return Ok(RuleOutcome::Unchanged);
        }
        debug!(%file, candidates = candidates.len(), "reduced qualifiers");
        Ok(RuleOutcome::Changed(reduced))
    }
}

fn candidates(model: &SemanticModel) -> Vec<NodePath> {
    let tree = model.tree();
    tree.paths_of_kind(SyntaxKind::MemberAccess)
        .into_iter()
        .filter(|path| {
            let Some(qualifier) = tree.node_at(&path.child(0)) else {
                return false;
            };
            let Some(member) = model.symbol_of(path) else {
                return false;
            };
            match qualifier.kind() {
                SyntaxKind::ThisExpression => {
                    matches!(member.kind(), SymbolKind::Field | SymbolKind::Property)
                        && member.name().ends_with(TRAILING_MARKER)
                }
                SyntaxKind::IdentifierName => {
                    member.containing_type().is_some()
                        && member.containing_type() == model.enclosing_type_of(path)
                }
                _ => false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterRegistry;
    use restyle_semantic::SourceFile;
    use restyle_syntax::Formatter;
    use std::path::Path;

    fn run(source: &str) -> (Program, RuleOutcome<Program>) {
        let file = SourceFile::parse(Path::new("A.cs"), source).expect("parse");
        let program = Program::new([file]);
        let mut context = RuleContext::new(AdapterRegistry::builtin());
        let outcome = ExplicitThis
            .apply(&mut context, &program, FileId::new(0))
            .expect("apply");
        (program, outcome)
    }

    fn render(program: &Program) -> String {
        Formatter::default().apply_layout(program.file(FileId::new(0)).expect("file").tree())
    }

    #[test]
    fn drops_this_before_marked_fields() {
        let (_, outcome) = run("class A { int count_; void M() { this.count_ = 1; } }");
        let RuleOutcome::Changed(program) = outcome else {
            panic!("expected a change");
        };
        assert!(render(&program).contains("        count_ = 1;"));
    }

    #[test]
    fn keeps_this_before_unmarked_members() {
        let (_, outcome) = run("class A { int count; void M() { this.count = 1; this.Run(); } void Run() { } }");
        assert!(!outcome.is_changed());
    }

    #[test]
    fn drops_the_enclosing_type_name() {
        let (_, outcome) = run("class A { const int kMax = 1; int M() { return A.kMax; } }");
        let RuleOutcome::Changed(program) = outcome else {
            panic!("expected a change");
        };
        assert!(render(&program).contains("return kMax;"));
    }

    #[test]
    fn keeps_qualifiers_that_a_parameter_would_shadow() {
        let (_, outcome) = run("class A { int value_; void Set(int value_) { this.value_ = value_; } }");
        assert!(!outcome.is_changed());
    }
}
