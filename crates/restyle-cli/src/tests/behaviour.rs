//! Step definitions for `tests/features/restyle_cli.feature`.

use std::cell::RefCell;
use std::process::ExitCode;

use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{TestWorld, world};

fn unquoted(text: &str) -> &str {
    text.trim().trim_matches('"')
}

// ===== Given Steps =====

#[given("a file {name} containing {source}")]
fn given_file(world: &RefCell<TestWorld>, name: String, source: String) {
    world
        .borrow()
        .write(&name, unquoted(&source))
        .expect("write source");
}

#[given("the rule {rule} is disabled")]
fn given_disabled_rule(world: &RefCell<TestWorld>, rule: String) {
    world.borrow_mut().config.disabled_rules.push(rule);
}

// ===== When Steps =====

#[when("restyle runs")]
fn when_restyle_runs(world: &RefCell<TestWorld>) {
    world.borrow_mut().run(&[]);
}

#[when("restyle runs with {flag}")]
fn when_restyle_runs_with(world: &RefCell<TestWorld>, flag: String) {
    world.borrow_mut().run(&[flag.as_str()]);
}

// ===== Then Steps =====

#[then("the CLI succeeds")]
fn then_success(world: &RefCell<TestWorld>) {
    let harness = world.borrow();
    assert_eq!(harness.exit_code(), ExitCode::SUCCESS, "{}", harness.stderr_text());
}

#[then("the CLI fails")]
fn then_failure(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().exit_code(), ExitCode::FAILURE);
}

#[then("the file {name} contains {text}")]
fn then_file_contains(world: &RefCell<TestWorld>, name: String, text: String) {
    let output = world.borrow().read(&name).expect("read output");
    assert!(output.contains(unquoted(&text)), "{output}");
}

#[then("stdout mentions {text}")]
fn then_stdout_mentions(world: &RefCell<TestWorld>, text: String) {
    let stdout = world.borrow().stdout_text();
    assert!(stdout.contains(unquoted(&text)), "{stdout}");
}

#[then("stderr mentions {text}")]
fn then_stderr_mentions(world: &RefCell<TestWorld>, text: String) {
    let stderr = world.borrow().stderr_text();
    assert!(stderr.contains(unquoted(&text)), "{stderr}");
}

#[scenario(
    path = "tests/features/restyle_cli.feature",
    name = "Files are rewritten in place"
)]
fn files_are_rewritten(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/restyle_cli.feature",
    name = "Check mode fails when a file would change"
)]
fn check_mode_fails(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/restyle_cli.feature",
    name = "A disabled rule leaves its names alone"
)]
fn disabled_rule(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/restyle_cli.feature",
    name = "A file that does not parse is reported"
)]
fn unparsable_file(world: RefCell<TestWorld>) {
    let _ = world;
}
