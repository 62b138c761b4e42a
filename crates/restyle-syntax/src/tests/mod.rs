//! Crate-level tests for restyle-syntax.

mod behaviour;
mod unit;
