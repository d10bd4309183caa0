//! Conversions between crate types and LSP types.

use std::collections::HashMap;

use tower_lsp::lsp_types as lsp;
use url::Url;

use crate::analyzer::Diagnostic;
use crate::base::{Position, Span};
use crate::ide::{CompletionItem, CompletionKind, DocumentLink, GotoTarget, HoverResult, RenameEdit};

pub fn position(position: lsp::Position) -> Position {
    Position::new(position.line, position.character)
}

pub fn lsp_position(position: Position) -> lsp::Position {
    lsp::Position::new(position.line, position.column)
}

pub fn range(span: Span) -> lsp::Range {
    lsp::Range::new(lsp_position(span.start), lsp_position(span.end))
}

fn completion_kind(kind: CompletionKind) -> lsp::CompletionItemKind {
    match kind {
        CompletionKind::Function => lsp::CompletionItemKind::FUNCTION,
        CompletionKind::Variable => lsp::CompletionItemKind::VARIABLE,
        CompletionKind::Class => lsp::CompletionItemKind::CLASS,
        CompletionKind::Interface => lsp::CompletionItemKind::INTERFACE,
        CompletionKind::Property => lsp::CompletionItemKind::PROPERTY,
        CompletionKind::Keyword => lsp::CompletionItemKind::KEYWORD,
        CompletionKind::Snippet => lsp::CompletionItemKind::SNIPPET,
        CompletionKind::Operator => lsp::CompletionItemKind::OPERATOR,
    }
}

pub fn completion_item(item: CompletionItem) -> lsp::CompletionItem {
    lsp::CompletionItem {
        label: item.label.to_string(),
        kind: Some(completion_kind(item.kind)),
        detail: item.detail.map(|d| d.to_string()),
        documentation: item.documentation.map(|doc| {
            lsp::Documentation::MarkupContent(lsp::MarkupContent {
                kind: lsp::MarkupKind::Markdown,
                value: doc.to_string(),
            })
        }),
        insert_text: item.insert_text.map(|t| t.to_string()),
        insert_text_format: item.is_snippet.then_some(lsp::InsertTextFormat::SNIPPET),
        sort_text: item.sort_text.map(|t| t.to_string()),
        ..lsp::CompletionItem::default()
    }
}

pub fn location(target: GotoTarget) -> lsp::Location {
    lsp::Location::new(target.uri, range(target.span))
}

pub fn hover(result: HoverResult) -> lsp::Hover {
    lsp::Hover {
        contents: lsp::HoverContents::Markup(lsp::MarkupContent {
            kind: lsp::MarkupKind::Markdown,
            value: result.contents,
        }),
        range: Some(range(result.span)),
    }
}

pub fn diagnostic(diagnostic: Diagnostic) -> lsp::Diagnostic {
    lsp::Diagnostic {
        range: range(diagnostic.span),
        severity: Some(lsp::DiagnosticSeverity::ERROR),
        source: Some("bitbake".to_string()),
        message: diagnostic.message,
        ..lsp::Diagnostic::default()
    }
}

pub fn document_link(link: DocumentLink) -> lsp::DocumentLink {
    lsp::DocumentLink {
        range: range(link.span),
        target: Some(link.target),
        tooltip: None,
        data: None,
    }
}

pub fn workspace_edit(uri: Url, edits: Vec<RenameEdit>) -> lsp::WorkspaceEdit {
    let edits = edits
        .into_iter()
        .map(|edit| lsp::TextEdit::new(range(edit.span), edit.new_text))
        .collect();
    lsp::WorkspaceEdit {
        changes: Some(HashMap::from([(uri, edits)])),
        ..lsp::WorkspaceEdit::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_completion() {
        let item = CompletionItem::new("do_build", CompletionKind::Snippet)
            .with_insert_text("do_build() {\n\t$1\n}");
        let converted = completion_item(item);
        assert_eq!(converted.kind, Some(lsp::CompletionItemKind::SNIPPET));
        assert_eq!(converted.insert_text_format, Some(lsp::InsertTextFormat::SNIPPET));
        assert_eq!(converted.label, "do_build");
    }

    #[test]
    fn test_rename_edits_are_grouped_by_uri() {
        let uri = Url::parse("file:///layer/foo.bb").expect("valid uri");
        let edit = workspace_edit(
            uri.clone(),
            vec![RenameEdit {
                span: Span::from_coords(0, 0, 0, 3),
                new_text: "BAR".to_string(),
            }],
        );
        let changes = edit.changes.expect("changes");
        assert_eq!(changes[&uri][0].range, lsp::Range::new(lsp::Position::new(0, 0), lsp::Position::new(0, 3)));
    }
}
