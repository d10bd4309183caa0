//! Project scanner tests
//!
//! Tests for:
//! - The scan pipeline against a layer on disk
//! - Run coalescing
//! - Pipeline failures
//! - Append overlay matching

pub mod tests_append_matching;
pub mod tests_scanner;
