//! IDE features: high-level APIs for LSP handlers.
//!
//! This module sits between the analyzer and the LSP server. Each function
//! corresponds to an LSP request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No LSP types**: Uses our own types, converted at the LSP boundary
//! 3. **Empty over absent**: "nothing found" is an empty result, never an error
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use bitbake_ls::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.analyze(&uri, "SUMMARY = \"demo\"\n", 1, true);
//!
//! let analysis = host.analysis();
//! let items = analysis.completions(&uri, position);
//! ```

mod analysis;
mod completion;
pub mod docs;
mod document_links;
mod goto;
mod hover;
mod rename;

pub use analysis::{Analysis, AnalysisHost};
pub use completion::{CompletionItem, CompletionKind, completions};
pub use docs::{DocInfo, DocScanner, DocSource};
pub use document_links::{DocumentLink, document_links};
pub use goto::{GotoTarget, definition_for_directive, definition_for_symbol, goto_definition};
pub use hover::{HoverResult, hover};
pub use rename::{RenameEdit, prepare_rename, rename};
