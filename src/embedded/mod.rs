//! Synthetic python and shell documents built from a recipe.
//!
//! Each view keeps the recipe's line and column layout: code of the other
//! language is blanked to spaces, so a position in the synthetic document is
//! the recipe position shifted down by [`EmbeddedLanguage::line_offset`].
//! Positions inside edited headers and string quotes are the only ones that
//! may move, and only within their own line.

mod bash;
mod edits;
mod error;
mod language;
mod python;
mod store;

pub use edits::{EditKind, EmbeddedBuffer, TextEdit};
pub use error::EmbeddedError;
pub use language::{EmbeddedLanguage, embedded_language_at};
pub use store::{EMBEDDED_DOCUMENTS_DIR, EmbeddedDocument, EmbeddedDocumentStore};

use crate::analyzer::AnalyzedDocument;

/// Render the `language` view of `document`.
///
/// The result depends only on the document text, so equal inputs always give
/// byte-identical output.
pub fn synthesize(document: &AnalyzedDocument, language: EmbeddedLanguage) -> String {
    let root = document.syntax();
    let mut buffer = EmbeddedBuffer::new(document.text());
    match language {
        EmbeddedLanguage::Bash => bash::collect(&root, &mut buffer),
        EmbeddedLanguage::Python => python::collect(&root, &mut buffer),
    }
    buffer.finish(language.preamble())
}
