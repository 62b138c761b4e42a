//! Scenario bindings for the `restyle-rules` BDD feature file.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use super::TestWorld;

/// Fixture providing the shared BDD world.
#[fixture]
fn world() -> RefCell<TestWorld> {
    super::world()
}

#[scenario(
    path = "tests/features/restyle_rules.feature",
    name = "Private fields gain the trailing marker"
)]
fn private_fields(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_rules.feature",
    name = "Constants are renamed to the constant style"
)]
fn constants(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_rules.feature",
    name = "Serialized properties keep their names"
)]
fn serialized_properties(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_rules.feature",
    name = "Single statement bodies are braced"
)]
fn braces(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_rules.feature",
    name = "A second run finds nothing to change"
)]
fn idempotence(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_rules.feature",
    name = "A broken file does not stop the others"
)]
fn failure_isolation(world: RefCell<TestWorld>) {
    drop(world);
}
