//! The per-document semantic model.

use rowan::{GreenNode, TextRange, TextSize, TokenAtOffset};
use url::Url;

use super::symbols::SymbolTable;
use crate::base::{LineIndex, Position, Span};
use crate::parser::{AstNode, Recipe, SyntaxNode, SyntaxToken};

/// A problem reported for a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
}

/// Everything known about one analyzed document.
///
/// The model is replaced as a whole on every analysis; nothing in it is
/// patched in place except the uri on rename.
#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    pub(super) uri: Url,
    pub(super) version: i32,
    pub(super) text: String,
    pub(super) line_index: LineIndex,
    pub(super) green: GreenNode,
    pub(super) symbols: SymbolTable,
    pub(super) dependencies: Vec<Url>,
    pub(super) diagnostics: Vec<Diagnostic>,
}

impl AnalyzedDocument {
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Root of the concrete syntax tree
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn recipe(&self) -> Option<Recipe> {
        Recipe::cast(self.syntax())
    }

    /// Global declarations, in first-declaration order
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Documents pulled in by `inherit`, `include` and `require`
    pub fn dependencies(&self) -> &[Url] {
        &self.dependencies
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn line_text(&self, line: u32) -> Option<&str> {
        self.line_index.line_text(&self.text, line)
    }

    pub fn offset(&self, position: Position) -> Option<TextSize> {
        self.line_index.offset(&self.text, position)
    }

    pub fn span(&self, range: TextRange) -> Span {
        self.line_index.span(&self.text, range)
    }

    /// The token covering the character at `position`.
    ///
    /// At a boundary between two tokens the one starting there wins, so the
    /// answer always describes the character to the right of the position.
    pub fn token_at(&self, position: Position) -> Option<SyntaxToken> {
        let offset = self.offset(position)?;
        match self.syntax().token_at_offset(offset) {
            TokenAtOffset::None => None,
            TokenAtOffset::Single(token) => Some(token),
            TokenAtOffset::Between(_, right) => Some(right),
        }
    }
}
