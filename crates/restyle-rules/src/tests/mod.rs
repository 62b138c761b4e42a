//! Unit and behavioural tests for the rule engine.

mod behaviour;
mod coordinator;
mod support;
