//! Behaviour-driven development (BDD) step definitions for restyle-semantic scenarios.

use std::cell::RefCell;
use std::path::Path;

use rstest::fixture;
use rstest_bdd_macros::{given, then, when};
use restyle_syntax::{Formatter, SyntaxKind};

use super::support::{declared, model};
use crate::{Conflict, FileId, Program, SourceFile, SymbolId, find_conflict, rename};

mod scenarios;

/// State shared across BDD steps.
#[derive(Default)]
pub(super) struct TestWorld {
    /// Files in declaration order.
    files: Vec<SourceFile>,
    /// Program before the operation under test.
    before: Option<Program>,
    /// Program after the operation under test.
    after: Option<Program>,
    /// Result of a conflict check.
    conflict: Option<Conflict>,
}

impl TestWorld {
    fn program(&mut self) -> Program {
        let program = Program::new(self.files.clone());
        self.before = Some(program.clone());
        program
    }

    fn file_id(&self, name: &str) -> FileId {
        let position = self
            .files
            .iter()
            .position(|file| file.path() == Path::new(name))
            .expect("file should exist");
        FileId::new(u32::try_from(position).expect("small index"))
    }
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

fn declarator_symbol(program: &Program, file: FileId, name: &str) -> SymbolId {
    declared(&model(program, file.get()), SyntaxKind::VariableDeclarator, name)
        .id()
        .clone()
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("a file {name} containing {source}")]
fn given_file(world: &RefCell<TestWorld>, name: String, source: String) {
    let file = SourceFile::parse(Path::new(strip_quotes(&name)), strip_quotes(&source))
        .expect("parse");
    world.borrow_mut().files.push(file);
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the field {field} declared in {file} is renamed to {name}")]
fn when_field_renamed(world: &RefCell<TestWorld>, field: String, file: String, name: String) {
    let mut w = world.borrow_mut();
    let program = w.program();
    let id = w.file_id(strip_quotes(&file));
    let symbol = declarator_symbol(&program, id, strip_quotes(&field));
    w.after = Some(rename(&program, &symbol, strip_quotes(&name)).expect("rename"));
}

#[when("the conflict check renames the local {local} in {file} to {name}")]
fn when_conflict_checked(world: &RefCell<TestWorld>, local: String, file: String, name: String) {
    let mut w = world.borrow_mut();
    let program = w.program();
    let id = w.file_id(strip_quotes(&file));
    let symbol = declarator_symbol(&program, id, strip_quotes(&local));
    w.conflict = find_conflict(&program, &symbol, strip_quotes(&name)).expect("check");
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("{count} files have changed")]
fn then_files_changed(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    let before = w.before.as_ref().expect("before");
    let after = w.after.as_ref().expect("after");
    assert_eq!(Program::changed_files(before, after).len(), count);
}

#[then("{file} contains {text}")]
fn then_file_contains(world: &RefCell<TestWorld>, file: String, text: String) {
    let w = world.borrow();
    let after = w.after.as_ref().expect("after");
    let id = w.file_id(strip_quotes(&file));
    let output = Formatter::default().apply_layout(after.file(id).expect("file").tree());
    assert!(output.contains(strip_quotes(&text)), "{output}");
}

#[then("a conflict is reported")]
fn then_conflict(world: &RefCell<TestWorld>) {
    assert!(world.borrow().conflict.is_some());
}
