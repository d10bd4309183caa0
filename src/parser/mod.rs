//! Rowan-based parser for the BitBake recipe language
//!
//! This module provides a lossless parser using:
//! - **logos** for fast lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! The CST preserves all whitespace and comments, so positions in the tree
//! are positions in the document. A typed AST layer sits on top.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//! ```
//!
//! Shell and python function bodies are kept as flat token runs; they are
//! handed to the embedded document synthesizer rather than parsed here.

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod lexer;
mod strings;
mod syntax_kind;
mod walk;

pub use ast::*;
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{Parse, SyntaxError, parse};
pub use syntax_kind::{BitbakeLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use walk::{WalkControl, walk};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
