//! Shared fixtures for the lock tests.
//!
//! The integration tests under `tests/` and the `run_fixture` binary build
//! their worlds through this crate so that every test sees the same
//! instances.

pub mod fixtures;
