//! Behaviour-driven development (BDD) step definitions for restyle-rules scenarios.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use restyle_semantic::{Program, SourceFile};
use restyle_syntax::{Formatter, SupportedLanguage, SyntaxKind, SyntaxNode, SyntaxTree};
use rstest::fixture;
use rstest_bdd_macros::{given, then, when};

use crate::{Coordinator, PipelineOptions, PipelineReport};

mod scenarios;

/// State shared across BDD steps.
#[derive(Default)]
pub(super) struct TestWorld {
    /// Files in declaration order.
    files: Vec<SourceFile>,
    /// Report of the first run.
    first: Option<PipelineReport>,
    /// Report of the second run.
    second: Option<PipelineReport>,
}

impl TestWorld {
    fn report(&self) -> &PipelineReport {
        self.first.as_ref().expect("pipeline should have run")
    }

    fn rendered(&self, name: &str) -> String {
        let program = &self.report().program;
        let (_, file) = program
            .files()
            .find(|(_, file)| file.path() == Path::new(name))
            .expect("file should exist");
        Formatter::default().apply_layout(file.tree())
    }
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

#[given("a file {name} containing {source}")]
fn given_file(world: &RefCell<TestWorld>, name: String, source: String) {
    let file = SourceFile::parse(Path::new(&unquote(&name)), &unquote(&source)).expect("parse");
    world.borrow_mut().files.push(file);
}

#[given("a file {name} that has no rules")]
fn given_unsupported_file(world: &RefCell<TestWorld>, name: String) {
    let file = SourceFile::new(
        PathBuf::from(unquote(&name)),
        SupportedLanguage::VisualBasic,
        SyntaxTree::new(SyntaxNode::new(SyntaxKind::CompilationUnit)),
    );
    world.borrow_mut().files.push(file);
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the pipeline runs")]
fn when_pipeline_runs(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let program = Program::new(w.files.clone());
    w.first = Some(Coordinator::builtin(PipelineOptions::default()).process(program));
}

#[when("the pipeline runs again on its output")]
fn when_pipeline_runs_again(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let program = w.report().program.clone();
    w.second = Some(Coordinator::builtin(PipelineOptions::default()).process(program));
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("{name} contains {text}")]
fn then_file_contains(world: &RefCell<TestWorld>, name: String, text: String) {
    let output = world.borrow().rendered(&unquote(&name));
    assert!(output.contains(&unquote(&text)), "{output}");
}

#[then("the second run changes no files")]
fn then_second_run_is_a_no_op(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    let second = w.second.as_ref().expect("second run");
    assert!(Program::changed_files(&w.report().program, &second.program).is_empty());
}

#[then("{name} is reported as failed")]
fn then_file_failed(world: &RefCell<TestWorld>, name: String) {
    let w = world.borrow();
    let expected = PathBuf::from(unquote(&name));
    assert!(
        w.report()
            .failures
            .iter()
            .any(|failure| failure.path == expected)
    );
}
