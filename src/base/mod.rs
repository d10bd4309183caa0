//! Foundation types for the BitBake analysis backend.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Position`], [`Span`] - Line/column positions (0-indexed, LSP compatible)
//! - [`LineIndex`] - Conversion between byte offsets and line/column positions
//! - [`text_utils`] - Word and symbol extraction from raw lines
//!
//! This module has NO dependencies on other crate modules.

mod line_index;
mod position;
pub mod text_utils;

pub use line_index::LineIndex;
pub use position::{Position, Span};

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};
