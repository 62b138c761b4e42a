//! Crate-level tests for restyle-semantic.

mod behaviour;
mod support;
