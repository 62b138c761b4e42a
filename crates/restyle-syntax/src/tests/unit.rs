//! Unit tests for restyle-syntax.

use std::path::Path;

use rstest::rstest;

use crate::{
    Annotation, BatchId, Formatter, Marker, Parser, SupportedLanguage, SyntaxError,
    SyntaxKind, SyntaxTree, TreeSitterSyntacticLock,
};

fn parse(source: &str) -> SyntaxTree {
    Parser::new(SupportedLanguage::CSharp)
        .expect("parser init")
        .parse(source)
        .expect("parse")
}

fn render(tree: &SyntaxTree) -> String {
    Formatter::default().apply_layout(tree)
}

// =============================================================================
// Parser Tests
// =============================================================================

#[test]
fn visual_basic_has_no_parser() {
    let error = Parser::new(SupportedLanguage::VisualBasic).expect_err("unsupported");
    assert!(matches!(error, SyntaxError::UnsupportedLanguage { .. }));
}

#[rstest]
#[case("class A { void M() { goto done; done: return; } }")]
#[case("class A { record Point(int X); }")]
#[case("class A { int this[int i] => i; }")]
#[case("class A { void M() { Run(value: 1); } }")]
#[case("class A { bool M(object o) => o is string { Length: > 0 } s && s.Length > 1; }")]
#[case("class A { public static A operator +(A a, A b) => a; }")]
#[case("class A { int M(object o) => o switch { int n => n, _ => 0 }; }")]
#[case("class A { (int, string) M() => (1, \"a\"); }")]
#[case("class A { int M(int x) => checked(x * 2); }")]
#[case("class A { delegate void Handler(int code); }")]
#[case("class A { void M() { var q = from x in items where x > 0 select x; } }")]
#[case("class A { void M() { int Local(int y) => y; Local(1); } }")]
#[case("class A { void M(object o) { if (o is string s) { Use(s); } } }")]
#[case("class A { int M(int x) { checked { x += 1; } return x; } }")]
#[case("class A { void M() { Action a = delegate { Run(); }; } }")]
fn constructs_without_a_structured_form_round_trip(#[case] source: &str) {
    let output = render(&parse(source));
    let failures = TreeSitterSyntacticLock::new()
        .validate_file(Path::new("Sample.cs"), &output)
        .expect("validate");
    assert!(failures.is_empty(), "{output}\n{failures:?}");
    assert_eq!(render(&parse(&output)), output);
}

#[test]
fn parse_errors_carry_line_numbers() {
    let parser = Parser::new(SupportedLanguage::CSharp).expect("parser init");
    let error = parser
        .parse("class A\n{\n    int x = ;\n}\n")
        .expect_err("should fail");
    assert!(matches!(error, SyntaxError::Parse { line: 3, .. }), "{error}");
}

#[test]
fn references_inside_kept_text_are_converted() {
    let tree = parse("class A { int this[int i] => items[i] + offset_; }");
    let names: Vec<_> = tree
        .paths_of_kind(SyntaxKind::IdentifierName)
        .iter()
        .filter_map(|path| tree.node_at(path)?.token())
        .map(str::to_owned)
        .collect();
    assert!(names.contains(&"offset_".to_owned()), "{names:?}");
    let parameters: Vec<_> = tree
        .paths_of_kind(SyntaxKind::DesignatedVariable)
        .iter()
        .filter_map(|path| tree.node_at(path)?.token())
        .map(str::to_owned)
        .collect();
    assert_eq!(parameters, ["i"]);
}

#[test]
fn field_declarators_are_separate_nodes() {
    let tree = parse("class A { private int a_, b_ = 2; }");
    let names: Vec<_> = tree
        .paths_of_kind(SyntaxKind::VariableDeclarator)
        .iter()
        .filter_map(|path| tree.node_at(path)?.token())
        .map(str::to_owned)
        .collect();
    assert_eq!(names, ["a_", "b_"]);
}

#[test]
fn member_access_keeps_name_as_token() {
    let tree = parse("class A { void M() { this.count_ = other.Value; } }");
    let accesses: Vec<_> = tree
        .paths_of_kind(SyntaxKind::MemberAccess)
        .iter()
        .filter_map(|path| {
            let node = tree.node_at(path)?;
            Some((node.child(0)?.kind(), node.token()?.to_owned()))
        })
        .collect();
    assert_eq!(
        accesses,
        [
            (SyntaxKind::ThisExpression, "count_".to_owned()),
            (SyntaxKind::IdentifierName, "Value".to_owned()),
        ]
    );
}

#[test]
fn interpolation_holes_are_parsed_as_expressions() {
    let tree = parse("class A { string M(int count) => $\"{count} items\"; }");
    let names: Vec<_> = tree
        .paths_of_kind(SyntaxKind::IdentifierName)
        .iter()
        .filter_map(|path| tree.node_at(path)?.token())
        .map(str::to_owned)
        .collect();
    assert!(names.contains(&"count".to_owned()));
}

// =============================================================================
// Tree Tests
// =============================================================================

#[test]
fn markers_survive_rendering_and_are_not_printed() {
    let tree = parse("class A { int x; }");
    let declarator = tree
        .paths_of_kind(SyntaxKind::VariableDeclarator)
        .into_iter()
        .next()
        .expect("declarator");
    let marker = Annotation::Marker(Marker::new(BatchId::new(7), 0));
    let annotated = tree.annotate(&declarator, marker).expect("annotate");
    assert!(annotated.has_annotation(|a| a.is_marker_of(BatchId::new(7))));
    assert!(!annotated.has_annotation(|a| a.is_marker_of(BatchId::new(8))));
    assert_eq!(render(&annotated), render(&tree));
}

// =============================================================================
// Printer and Lock Tests
// =============================================================================

#[rstest]
#[case("class A { void M() { for (int i = 0; i < n; i++) { Step(i); } } }")]
#[case("class A { void M() { switch (x) { case 1: Run(); break; default: break; } } }")]
#[case("class A { void M() { try { Run(); } catch (Exception ex) { Log(ex); } finally { Done(); } } }")]
#[case("class A { int P { get; set; } = 3; }")]
#[case("enum Color { Red = 1, Green }")]
fn rendered_output_passes_the_syntactic_lock(#[case] source: &str) {
    let output = render(&parse(source));
    let failures = TreeSitterSyntacticLock::new()
        .validate_file(Path::new("Sample.cs"), &output)
        .expect("validate");
    assert!(failures.is_empty(), "{output}\n{failures:?}");
}
