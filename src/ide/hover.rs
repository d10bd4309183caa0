//! Hover information implementation.

use tracing::debug;
use url::Url;

use super::docs::DocScanner;
use crate::analyzer::Analyzer;
use crate::base::{Position, Span};

/// Result of a hover request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    /// The hover content (markdown).
    pub contents: String,
    /// Range of the hovered name.
    pub span: Span,
}

/// Documentation of the variable assigned at `position`.
///
/// Only names on the left of an assignment that are also declared in the
/// document get a hover, and only when the documentation knows them.
pub fn hover(analyzer: &Analyzer, docs: &DocScanner, uri: &Url, position: Position) -> Option<HoverResult> {
    let document = analyzer.document(uri)?;
    let word = document.word_at(position)?;

    let declared = analyzer
        .global_declaration_symbols(uri)
        .iter()
        .any(|symbol| symbol.name == word);
    if !declared {
        return None;
    }
    let (_, span) = document.identifier_of_variable_assignment(position)?;

    let Some(info) = docs.variable_info(&word) else {
        debug!(word, "not a documented variable");
        return None;
    };
    if span.start.column > position.column || span.end.column <= position.column {
        return None;
    }

    Some(HoverResult {
        contents: format!("**{word}**\n___\n{}", info.definition),
        span,
    })
}
