//! Scenario bindings for the `restyle-semantic` BDD feature file.

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
    path = "tests/features/restyle_semantic.feature",
    name = "A field referenced from three files is renamed everywhere"
)]
fn field_renamed_everywhere(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_semantic.feature",
    name = "A rename that would capture a reference is reported"
)]
fn capture_is_reported(world: RefCell<TestWorld>) {
    drop(world);
}
