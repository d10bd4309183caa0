//! Document analysis: syntax trees, global declarations, directive
//! dependencies and cursor context.
//!
//! ## Data flow
//!
//! ```text
//! text ─▶ parse ─▶ AnalyzedDocument { tree, symbols, dependencies, diagnostics }
//!                        │
//!                        └─▶ never-analyzed dependencies ─▶ pending queue
//! ```
//!
//! Context queries (`is_string_content`, `is_override`, …) walk the tree of
//! the latest parse on every call instead of consulting a cached index.

#[allow(clippy::module_inception)]
mod analyzer;
mod context;
mod dependencies;
mod document;
mod error;
mod scan_results;
mod symbols;

pub use analyzer::Analyzer;
pub use context::SourceReference;
pub use dependencies::resolve_dependencies;
pub use document::{AnalyzedDocument, Diagnostic};
pub use error::AnalysisError;
pub use scan_results::RecipeScanResult;
pub use symbols::{Location, Symbol, SymbolKind, SymbolTable, extract_symbols};
