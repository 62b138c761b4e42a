//! Behaviour-driven development (BDD) step definitions for restyle-syntax scenarios.

use std::cell::RefCell;
use std::path::PathBuf;

use rstest::fixture;
use rstest_bdd_macros::{given, then, when};

use crate::{
    Formatter, Parser, SupportedLanguage, SyntaxError, TreeSitterSyntacticLock, ValidationFailure,
};

mod scenarios;

/// State shared across BDD steps.
#[derive(Default)]
pub(super) struct TestWorld {
    /// Source under test.
    source: Option<String>,
    /// File handed to the syntactic lock directly.
    file: Option<(PathBuf, String)>,
    /// Formatted output, when parsing succeeded.
    output: Option<String>,
    /// Parse error, when parsing failed.
    error: Option<SyntaxError>,
    /// Failures reported by the syntactic lock.
    failures: Vec<ValidationFailure>,
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes and expands `\n` escapes.
fn unquote(s: &str) -> String {
    s.trim_matches('"').replace("\\n", "\n")
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("source code {code}")]
fn given_source(world: &RefCell<TestWorld>, code: String) {
    world.borrow_mut().source = Some(unquote(&code));
}

#[given("a file {filename} with content {content}")]
fn given_file(world: &RefCell<TestWorld>, filename: String, content: String) {
    world.borrow_mut().file = Some((PathBuf::from(unquote(&filename)), unquote(&content)));
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the source is parsed and formatted")]
fn when_formatted(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let source = w.source.clone().expect("source should be set");
    let parser = Parser::new(SupportedLanguage::CSharp).expect("parser init");
    match parser.parse(&source) {
        Ok(tree) => {
            let output = Formatter::default().apply_layout(&tree);
            w.failures = TreeSitterSyntacticLock::new()
                .validate_file(&PathBuf::from("Input.cs"), &output)
                .expect("validate");
            w.output = Some(output);
        }
        Err(error) => w.error = Some(error),
    }
}

#[when("the syntactic lock validates the file")]
fn when_validated(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let (path, content) = w.file.clone().expect("file should be set");
    w.failures = TreeSitterSyntacticLock::new()
        .validate_file(&path, &content)
        .expect("validate");
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("parsing succeeds")]
fn then_parsing_succeeds(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    assert!(w.error.is_none(), "unexpected error: {:?}", w.error);
    assert!(w.output.is_some());
}

#[then("parsing fails with a message containing {fragment}")]
fn then_parsing_fails(world: &RefCell<TestWorld>, fragment: String) {
    let w = world.borrow();
    let error = w.error.as_ref().expect("parse should fail");
    assert!(error.to_string().contains(&unquote(&fragment)), "{error}");
}

#[then("the syntactic lock reports no failures")]
fn then_no_failures(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    assert!(w.failures.is_empty(), "{:?}", w.failures);
}

#[then("the syntactic lock reports a failure on line {line}")]
fn then_failure_on_line(world: &RefCell<TestWorld>, line: u32) {
    let w = world.borrow();
    assert!(
        w.failures.iter().any(|failure| failure.line == line),
        "{:?}",
        w.failures
    );
}

#[then("the output contains {fragment}")]
fn then_output_contains(world: &RefCell<TestWorld>, fragment: String) {
    let w = world.borrow();
    let output = w.output.as_ref().expect("output should be set");
    assert!(output.contains(&unquote(&fragment)), "{output}");
}
