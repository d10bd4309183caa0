//! Embedded languages and where they occur in a recipe.

use serde::{Deserialize, Serialize};

use crate::analyzer::AnalyzedDocument;
use crate::base::Position;
use crate::parser::SyntaxKind;

/// A general-purpose language written inline in a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddedLanguage {
    Bash,
    Python,
}

impl EmbeddedLanguage {
    pub const ALL: [EmbeddedLanguage; 2] = [EmbeddedLanguage::Bash, EmbeddedLanguage::Python];

    pub fn tag(self) -> &'static str {
        match self {
            EmbeddedLanguage::Bash => "bash",
            EmbeddedLanguage::Python => "python",
        }
    }

    /// File extension of synthetic documents, with its dot
    pub fn extension(self) -> &'static str {
        match self {
            EmbeddedLanguage::Bash => ".sh",
            EmbeddedLanguage::Python => ".py",
        }
    }

    /// Text prepended to every synthetic document
    pub fn preamble(self) -> &'static str {
        match self {
            EmbeddedLanguage::Bash => "",
            EmbeddedLanguage::Python => "import bb\n",
        }
    }

    /// Lines the preamble shifts the original text down by
    pub fn line_offset(self) -> u32 {
        self.preamble().matches('\n').count() as u32
    }
}

/// Language of the embedded code under the cursor.
///
/// Function headers are BitBake, only bodies count, except for `def`
/// functions which are python from the first keyword on.
pub fn embedded_language_at(document: &AnalyzedDocument, position: Position) -> Option<EmbeddedLanguage> {
    let token = document.token_at(position)?;
    let mut in_body = false;
    for node in token.parent_ancestors() {
        match node.kind() {
            SyntaxKind::INLINE_PYTHON | SyntaxKind::DEF_FUNCTION => return Some(EmbeddedLanguage::Python),
            SyntaxKind::FUNCTION_BODY => in_body = true,
            SyntaxKind::PYTHON_FUNCTION if in_body => return Some(EmbeddedLanguage::Python),
            SyntaxKind::FUNCTION_DEFINITION if in_body => return Some(EmbeddedLanguage::Bash),
            _ => {}
        }
    }
    None
}
