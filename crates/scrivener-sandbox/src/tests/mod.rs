//! Test suites for the path sandbox.

mod support;
