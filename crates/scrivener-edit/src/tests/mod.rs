//! Test suites for the edit engine.

mod file_behaviour;
pub(crate) mod support;
