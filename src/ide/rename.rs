//! Rename of variables and functions within one document.

use crate::analyzer::AnalyzedDocument;
use crate::base::{Position, Span};
use crate::parser::{SyntaxKind, SyntaxNode, WalkControl, walk};

/// Replace the text at `span` with `new_text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameEdit {
    pub span: Span,
    pub new_text: String,
}

fn is_name(node: &SyntaxNode) -> bool {
    matches!(node.kind(), SyntaxKind::VARIABLE_NAME | SyntaxKind::FUNCTION_NAME)
}

/// Name node under the cursor. Names built from expansions such as
/// `RDEPENDS_${PN}` cannot be renamed.
fn name_at(document: &AnalyzedDocument, position: Position) -> Option<SyntaxNode> {
    let token = document.token_at(position)?;
    if token.kind() != SyntaxKind::IDENT && !token.kind().is_keyword() {
        return None;
    }
    let node = token.parent().filter(is_name)?;
    let plain = node
        .children()
        .all(|child| child.kind() != SyntaxKind::VARIABLE_EXPANSION);
    plain.then_some(node)
}

/// Name and range to rename at `position`.
pub fn prepare_rename(document: &AnalyzedDocument, position: Position) -> Option<(String, Span)> {
    let node = name_at(document, position)?;
    Some((node.text().to_string(), document.span(node.text_range())))
}

/// Edits renaming every declaration and `${…}` reference of the name under
/// the cursor.
pub fn rename(document: &AnalyzedDocument, position: Position, new_name: &str) -> Vec<RenameEdit> {
    let Some(node) = name_at(document, position) else {
        return Vec::new();
    };
    let name = node.text().to_string();

    let mut edits = Vec::new();
    let mut push = |range| {
        edits.push(RenameEdit {
            span: document.span(range),
            new_text: new_name.to_string(),
        })
    };
    walk(&document.syntax(), |node| {
        if is_name(node) && node.text() == name.as_str() {
            push(node.text_range());
            return WalkControl::SkipChildren;
        }
        if node.kind() == SyntaxKind::VARIABLE_EXPANSION {
            node.children_with_tokens()
                .filter_map(|e| e.into_token())
                .filter(|t| t.kind() == SyntaxKind::IDENT && t.text() == name)
                .for_each(|t| push(t.text_range()));
            return WalkControl::SkipChildren;
        }
        WalkControl::Continue
    });
    edits
}
