//! Shared helpers for the integration tests.

pub mod fixtures;
pub mod host_helpers;
pub mod runner;
