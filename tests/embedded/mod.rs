//! Embedded language tests
//!
//! Tests for:
//! - Python and shell views of a full recipe
//! - Synthetic documents on disk

pub mod tests_store;
pub mod tests_synthesis;
