//! # bitbake-ls
//!
//! Analysis backend for the BitBake recipe language: lossless parsing,
//! per-document analysis, project scanning, embedded python and shell views,
//! and the IDE features built on top of them.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! server    → tower-lsp backend, custom BitBake methods
//!   ↓
//! ide       → AnalysisHost, completion, hover, goto-def, rename, links
//!   ↓
//! embedded  → synthetic python/bash documents and their store
//!   ↓
//! analyzer  → per-document model, symbols, dependency queue
//!   ↓
//! project   → BitBake driver, project scanner, snapshot, settings
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, typed AST
//!   ↓
//! base      → Primitives (Position, Span, LineIndex, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → project → analyzer → embedded → ide → server)
// ============================================================================

/// Foundation types: Position, Span, LineIndex, text utilities
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, rowan tree, typed AST
pub mod parser;

/// Project knowledge: BitBake driver, scanner, snapshot, settings
pub mod project;

/// Document analysis: symbols, dependencies, cursor context
pub mod analyzer;

/// Embedded languages: synthetic python and shell documents
pub mod embedded;

/// IDE features: completion, hover, goto-definition, rename, links
pub mod ide;

/// LSP server: tower-lsp backend and custom methods
pub mod server;

// Re-export foundation types
pub use base::{LineIndex, Position, Span, TextRange, TextSize};
