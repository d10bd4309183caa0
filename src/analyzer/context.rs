//! Cursor context classification, answered straight from the syntax tree.

use rowan::{TextRange, TextSize};
use smol_str::SmolStr;

use super::document::AnalyzedDocument;
use crate::base::{Position, Span};
use crate::parser::{
    AstNode, Directive, DirectiveKind, StringLiteral, SyntaxKind, SyntaxNode, SyntaxToken,
    VariableAssignment,
};

/// Variables whose values reference files next to the recipe
const SOURCE_VARIABLES: &[&str] = &["SRC_URI", "LIC_FILES_CHKSUM"];

const FILE_SCHEME: &str = "file://";

/// A `file://` entry of a source variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    /// Path after the scheme, without `;` parameters
    pub name: SmolStr,
    pub span: Span,
}

fn has_ancestor(token: &SyntaxToken, kind: SyntaxKind) -> bool {
    token.parent_ancestors().any(|node| node.kind() == kind)
}

/// Name node (variable or function) directly holding `token`, if any.
fn name_node(token: &SyntaxToken) -> Option<SyntaxNode> {
    token
        .parent_ancestors()
        .take_while(|node| matches!(node.kind(), SyntaxKind::VARIABLE_NAME | SyntaxKind::FUNCTION_NAME | SyntaxKind::VARIABLE_EXPANSION))
        .find(|node| matches!(node.kind(), SyntaxKind::VARIABLE_NAME | SyntaxKind::FUNCTION_NAME))
}

impl AnalyzedDocument {
    /// Literal text inside quotes, outside any `${…}` region
    pub fn is_string_content(&self, position: Position) -> bool {
        self.token_at(position).is_some_and(|token| {
            token.kind() == SyntaxKind::STRING_CONTENT
                && token.parent().is_some_and(|p| p.kind() == SyntaxKind::STRING_LITERAL)
        })
    }

    /// Inside `${…}`, either in a value or in a raw function body
    pub fn is_variable_expansion(&self, position: Position) -> bool {
        let Some(token) = self.token_at(position) else {
            return false;
        };
        if has_ancestor(&token, SyntaxKind::VARIABLE_EXPANSION) || token.kind() == SyntaxKind::DOLLAR_L_BRACE {
            return true;
        }
        // Function bodies keep `${NAME}` as flat tokens.
        has_ancestor(&token, SyntaxKind::FUNCTION_BODY)
            && token
                .prev_token()
                .is_some_and(|prev| prev.kind() == SyntaxKind::DOLLAR_L_BRACE)
    }

    /// On an override suffix such as `:append` of `VAR:append`
    pub fn is_override(&self, position: Position) -> bool {
        self.token_at(position)
            .is_some_and(|token| has_ancestor(&token, SyntaxKind::OVERRIDE))
    }

    /// On the name of a variable or function
    pub fn is_identifier(&self, position: Position) -> bool {
        self.token_at(position).is_some_and(|token| {
            (token.kind() == SyntaxKind::IDENT || token.kind().is_keyword()) && name_node(&token).is_some()
        })
    }

    /// Name and span of the variable name under the cursor, when it belongs
    /// to an assignment. Names of functions and `export` statements do not
    /// count.
    pub fn identifier_of_variable_assignment(&self, position: Position) -> Option<(String, Span)> {
        let token = self.token_at(position)?;
        let name = name_node(&token).filter(|node| node.kind() == SyntaxKind::VARIABLE_NAME)?;
        let assignment = name.parent().and_then(VariableAssignment::cast)?;
        assignment.operator()?;
        Some((name.text().to_string(), self.span(name.text_range())))
    }

    /// The word under the cursor.
    ///
    /// Inside a variable or function name the whole name is returned, e.g.
    /// `RDEPENDS_${PN}`. Whitespace and literal string text yield nothing.
    pub fn word_at(&self, position: Position) -> Option<String> {
        let token = self.token_at(position)?;
        if token.kind().is_trivia()
            || matches!(
                token.kind(),
                SyntaxKind::NEWLINE | SyntaxKind::STRING_CONTENT | SyntaxKind::PYTHON_CODE
            )
        {
            return None;
        }
        match name_node(&token) {
            Some(node) => Some(node.text().to_string()),
            None => Some(token.text().to_string()),
        }
    }

    /// Kind of the directive statement on `line`, even when it has no
    /// argument yet.
    pub fn directive_at_line(&self, line: u32) -> Option<DirectiveKind> {
        let start = self.offset(Position::new(line, 0))?;
        let recipe = self.recipe()?;
        recipe
            .directives()
            .find(|directive| directive.syntax().text_range().start() == start)
            .map(|directive| directive.kind())
    }

    /// The directive whose argument list contains `position`
    pub fn directive_at(&self, position: Position) -> Option<Directive> {
        let token = self.token_at(position)?;
        token.parent_ancestors().find_map(Directive::cast)
    }

    /// The `file://` entry under the cursor inside `SRC_URI` or
    /// `LIC_FILES_CHKSUM`.
    pub fn source_reference_at(&self, position: Position) -> Option<SourceReference> {
        let offset = self.offset(position)?;
        let token = self.token_at(position)?;
        let literal = token.parent_ancestors().find_map(StringLiteral::cast)?;
        let assignment = literal.syntax().parent().and_then(VariableAssignment::cast)?;
        let name = assignment.variable_name()?;
        if !SOURCE_VARIABLES.contains(&name.as_str()) {
            return None;
        }
        self.file_references(&literal)
            .into_iter()
            .find(|(range, _)| range.contains_inclusive(offset))
            .map(|(range, name)| SourceReference {
                name,
                span: self.span(range),
            })
    }

    /// Every `file://` entry of every `SRC_URI` assignment, with the range of
    /// its path.
    pub fn source_file_references(&self) -> Vec<SourceReference> {
        let Some(recipe) = self.recipe() else {
            return Vec::new();
        };
        recipe
            .assignments()
            .filter(|a| a.variable_name().as_deref() == Some("SRC_URI"))
            .filter_map(|a| a.value())
            .flat_map(|literal| self.file_references(&literal))
            .map(|(range, name)| SourceReference {
                name,
                span: self.span(range),
            })
            .collect()
    }

    fn file_references(&self, literal: &StringLiteral) -> Vec<(TextRange, SmolStr)> {
        let base = literal.syntax().text_range().start();
        let text = literal.syntax().text().to_string();
        words_with_offsets(&text)
            .filter_map(|(start, word)| {
                let path = word.strip_prefix(FILE_SCHEME)?;
                let path = path.split(';').next().unwrap_or(path);
                if path.is_empty() {
                    return None;
                }
                let path_start = base + TextSize::new((start + FILE_SCHEME.len()) as u32);
                Some((TextRange::at(path_start, TextSize::of(path)), SmolStr::new(path)))
            })
            .collect()
    }
}

/// Whitespace separated words of a quoted value with their byte offsets.
/// Quotes and line continuations separate words too.
fn words_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let is_separator = |c: char| c.is_whitespace() || matches!(c, '\\' | '"' | '\'');
    let mut words = Vec::new();
    let mut start = None;
    for (idx, c) in text.char_indices() {
        match (is_separator(c), start) {
            (true, Some(s)) => {
                words.push((s, &text[s..idx]));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words.into_iter()
}
