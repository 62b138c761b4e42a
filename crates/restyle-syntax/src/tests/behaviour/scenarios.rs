//! Scenario bindings for the `restyle-syntax` BDD feature file.

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
    path = "tests/features/restyle_syntax.feature",
    name = "Formatted output is accepted by the reference grammar"
)]
fn formatted_output_validates(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_syntax.feature",
    name = "Comments are carried through formatting"
)]
fn comments_survive(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_syntax.feature",
    name = "Constructs without a structured form are kept as written"
)]
fn kept_constructs(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_syntax.feature",
    name = "Malformed source is reported with a position"
)]
fn malformed_source(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/restyle_syntax.feature",
    name = "Broken output is rejected by the syntactic lock"
)]
fn broken_output_rejected(world: RefCell<TestWorld>) {
    drop(world);
}
