//! IDE feature tests
//!
//! Tests for:
//! - Completion contexts
//! - Go-to-definition
//! - Hover with scanned documentation
//! - Document open, edit and close sequences

pub mod tests_completion;
pub mod tests_goto;
pub mod tests_hover;
pub mod tests_lifecycle;
