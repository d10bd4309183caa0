//! Analyzer tests
//!
//! Tests for:
//! - Dependency queueing across documents
//! - Version policy
//! - Recipe scan results

pub mod tests_dependencies;
pub mod tests_scan_results;
