//! Tests for the pipeline coordinator.

use mockall::Sequence;
use restyle_semantic::{FileId, Program, SourceFile};
use restyle_syntax::{SupportedLanguage, SyntaxKind, SyntaxNode, SyntaxTree};
use rstest::rstest;

use super::support::{has_transient_annotations, program, render};
use crate::pipeline::MAX_SYNTAX_PASSES;
use crate::rule::{MockGlobalSemanticRule, MockLocalSemanticRule, MockSyntaxRule};
use crate::{
    AdapterRegistry, BracesAlways, Coordinator, PipelineOptions, RuleDescriptor, RuleError,
    RuleOutcome,
};

fn descriptor(name: &'static str) -> RuleDescriptor {
    RuleDescriptor {
        name,
        description: "test rule",
        order: 1,
    }
}

fn single_file() -> Program {
    program(&[("A.cs", "class A { void M(bool x) { if (x) M(false); } }")])
}

#[test]
fn phases_run_in_order_for_each_file() {
    let mut sequence = Sequence::new();
    let mut syntax = MockSyntaxRule::new();
    syntax.expect_descriptor().return_const(descriptor("Syntax"));
    syntax
        .expect_apply()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(RuleOutcome::Unchanged));
    let mut local = MockLocalSemanticRule::new();
    local.expect_descriptor().return_const(descriptor("Local"));
    local
        .expect_apply()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _| Ok(RuleOutcome::Unchanged));
    let mut global = MockGlobalSemanticRule::new();
    global.expect_descriptor().return_const(descriptor("Global"));
    global
        .expect_apply()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _| Ok(RuleOutcome::Unchanged));

    let coordinator = Coordinator::new(AdapterRegistry::builtin(), PipelineOptions::default())
        .with_global_rule(global)
        .with_local_rule(local)
        .with_syntax_rule(syntax);
    let input = single_file();
    let report = coordinator.process(input.clone());

    assert_eq!(report.sweeps, 1);
    assert!(report.program.ptr_eq(&input));
}

#[test]
fn a_failing_file_is_rolled_back_and_others_continue() {
    let mut global = MockGlobalSemanticRule::new();
    global.expect_descriptor().return_const(descriptor("Global"));
    global.expect_apply().returning(|_, _, file| {
        if file == FileId::new(0) {
            Err(RuleError::residual_marker("Global", "A.cs"))
        } else {
            Ok(RuleOutcome::Unchanged)
        }
    });
    let coordinator = Coordinator::new(AdapterRegistry::builtin(), PipelineOptions::default())
        .with_syntax_rule(BracesAlways)
        .with_global_rule(global);
    let input = program(&[
        ("A.cs", "class A { void M(bool x) { if (x) M(false); } }"),
        ("B.cs", "class B { void M(bool x) { if (x) M(false); } }"),
    ]);

    let report = coordinator.process(input);

    assert_eq!(report.failures.len(), 1);
    let failure = report.failures.first().expect("failure");
    assert_eq!(failure.file, FileId::new(0));
    assert_eq!(failure.path.to_str(), Some("A.cs"));
    assert_eq!(render(&report.program, 0).matches('{').count(), 2);
    assert_eq!(render(&report.program, 1).matches('{').count(), 3);
}

#[test]
fn a_syntax_rule_that_never_settles_fails_its_file() {
    let mut syntax = MockSyntaxRule::new();
    syntax.expect_descriptor().return_const(descriptor("Flapping"));
    syntax
        .expect_apply()
        .times(MAX_SYNTAX_PASSES)
        .returning(|tree| Ok(RuleOutcome::Changed(tree.clone())));
    let coordinator = Coordinator::new(AdapterRegistry::builtin(), PipelineOptions::default())
        .with_syntax_rule(syntax);
    let input = single_file();

    let report = coordinator.process(input.clone());

    let [failure] = report.failures.as_slice() else {
        panic!("expected one failure");
    };
    assert!(matches!(
        failure.error,
        RuleError::Unsettled {
            rule: "Flapping",
            passes: MAX_SYNTAX_PASSES,
            ..
        }
    ));
    assert!(report.program.ptr_eq(&input));
}

#[rstest]
#[case("BracesAlways")]
#[case("bracesalways")]
fn disabled_rules_never_run(#[case] disabled: &str) {
    let mut syntax = MockSyntaxRule::new();
    syntax
        .expect_descriptor()
        .return_const(descriptor("BracesAlways"));
    syntax.expect_apply().never();
    let options = PipelineOptions {
        disabled_rules: vec![disabled.to_owned()],
        ..PipelineOptions::default()
    };
    let coordinator =
        Coordinator::new(AdapterRegistry::builtin(), options).with_syntax_rule(syntax);

    let report = coordinator.process(single_file());

    assert!(report.failures.is_empty());
}

#[test]
fn cancellation_stops_before_the_next_file() {
    let mut syntax = MockSyntaxRule::new();
    syntax.expect_descriptor().return_const(descriptor("Syntax"));
    syntax.expect_apply().never();
    let coordinator = Coordinator::new(AdapterRegistry::builtin(), PipelineOptions::default())
        .with_syntax_rule(syntax);
    coordinator.cancellation().cancel();
    let input = single_file();

    let report = coordinator.process(input.clone());

    assert!(report.cancelled);
    assert!(report.program.ptr_eq(&input));
}

#[test]
fn files_without_an_adapter_fail_alone() {
    let legacy = SourceFile::new(
        "Legacy.vb".into(),
        SupportedLanguage::VisualBasic,
        SyntaxTree::new(SyntaxNode::new(SyntaxKind::CompilationUnit)),
    );
    let modern = SourceFile::parse(
        std::path::Path::new("A.cs"),
        "class A { void M(bool x) { if (x) M(false); } }",
    )
    .expect("parse");
    let report = Coordinator::builtin(PipelineOptions::default())
        .process(Program::new([legacy, modern]));

    let [failure] = report.failures.as_slice() else {
        panic!("expected one failure");
    };
    assert!(matches!(
        failure.error,
        RuleError::UnsupportedLanguage {
            language: SupportedLanguage::VisualBasic
        }
    ));
    assert_eq!(render(&report.program, 1).matches('{').count(), 3);
}

#[test]
fn later_sweeps_pick_up_cross_phase_effects() {
    let input = program(&[(
        "A.cs",
        "class A { int count; void M() { this.count = 1; } }",
    )]);

    let report = Coordinator::builtin(PipelineOptions::default()).process(input);

    let text = render(&report.program, 0);
    assert!(text.contains("        count_ = 1;"), "{text}");
    assert!(!text.contains("this."), "{text}");
    assert_eq!(report.sweeps, 3);
    assert!(!has_transient_annotations(&report.program));
}

#[test]
fn renames_follow_nested_type_lookup() {
    let input = program(&[(
        "Outer.cs",
        "class Outer { class Inner { public void run() { } } \
         void M() { Inner i = new Inner(); i.run(); } } \
         class Inner { public void Run() { } }",
    )]);

    let report = Coordinator::builtin(PipelineOptions::default()).process(input);

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    let text = render(&report.program, 0);
    assert!(text.contains("public void Run()"), "{text}");
    assert!(text.contains("i.Run();"), "{text}");
    assert!(!text.contains("run"), "{text}");
}

#[test]
fn a_second_run_changes_nothing() {
    let input = program(&[
        (
            "Player.cs",
            "class Player { private int m_health; const int MAX_HEALTH = 100; \
             int max_mana { get; set; } \
             void take_damage(int damage_amount) { if (damage_amount > 0) this.m_health -= damage_amount; \
             foreach (var hit_point in points) Use(hit_point); } \
             void Use(int value) { } int[] points; }",
        ),
        (
            "Game.cs",
            "class Game { void run(Player p) { for (int i = 0; i < 3; i++) p.Use(i); } }",
        ),
    ]);
    let coordinator = Coordinator::builtin(PipelineOptions::default());

    let first = coordinator.process(input);
    assert!(first.failures.is_empty(), "{:?}", first.failures);
    let second = coordinator.process(first.program.clone());

    assert_eq!(second.sweeps, 1);
    assert!(Program::changed_files(&first.program, &second.program).is_empty());
    assert_eq!(render(&first.program, 0), render(&second.program, 0));
}

#[test]
fn builtin_rules_are_listed_in_execution_order() {
    let names: Vec<_> = Coordinator::builtin(PipelineOptions::default())
        .rules()
        .into_iter()
        .map(|(_, descriptor)| descriptor.name)
        .collect();
    assert_eq!(
        names,
        [
            "BracesAlways",
            "ExplicitThis",
            "FieldNames",
            "PropertyNames",
            "MethodNames",
            "LocalVariables"
        ]
    );
}
