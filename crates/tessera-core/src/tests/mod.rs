//! Crate-level integration tests.
//!
//! Per-type behavior is tested beside each type; the tests here exercise
//! whole frames and whole runs:
//! - `integration.rs`: movement/collision/deletion scenarios across full
//!   frames, plus complete `GameLoop::run` sessions.
//! - `helpers.rs`: backend and input doubles, entity factories.

mod helpers;
mod integration;
