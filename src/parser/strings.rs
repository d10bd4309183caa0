//! Lowering of quoted values into string pieces.
//!
//! The lexer keeps a quoted value as one `STRING` token. Inside assignments
//! it is split so that `${NAME}` and `${@ … }` regions get their own nodes and
//! context queries can be answered straight from the tree.

use super::syntax_kind::SyntaxKind;
use rowan::GreenNodeBuilder;

/// Emit a `STRING_LITERAL` node for `text`, which starts with its quote and
/// may lack the closing one.
pub(super) fn lower_string(builder: &mut GreenNodeBuilder<'static>, text: &str) {
    builder.start_node(SyntaxKind::STRING_LITERAL.into());

    let Some(quote) = text.chars().next() else {
        builder.finish_node();
        return;
    };
    let open = quote.len_utf8();
    builder.token(SyntaxKind::QUOTE.into(), &text[..open]);

    let closed = text.len() > open && text.ends_with(quote);
    let body_end = if closed { text.len() - open } else { text.len() };
    lower_pieces(builder, &text[open..body_end]);

    if closed {
        builder.token(SyntaxKind::QUOTE.into(), &text[body_end..]);
    }
    builder.finish_node();
}

fn lower_pieces(builder: &mut GreenNodeBuilder<'static>, body: &str) {
    let bytes = body.as_bytes();
    let mut content_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let (marker, node, inner) = if bytes[i..].starts_with(b"${@") {
            ("${@", SyntaxKind::INLINE_PYTHON, SyntaxKind::PYTHON_CODE)
        } else if bytes[i..].starts_with(b"${") {
            ("${", SyntaxKind::VARIABLE_EXPANSION, SyntaxKind::IDENT)
        } else {
            i += 1;
            continue;
        };

        flush_content(builder, &body[content_start..i]);
        let inner_start = i + marker.len();
        let close = matching_brace(bytes, inner_start);
        let inner_end = close.unwrap_or(bytes.len());

        builder.start_node(node.into());
        let marker_kind = if node == SyntaxKind::INLINE_PYTHON {
            SyntaxKind::DOLLAR_L_BRACE_AT
        } else {
            SyntaxKind::DOLLAR_L_BRACE
        };
        builder.token(marker_kind.into(), marker);
        if inner_end > inner_start {
            builder.token(inner.into(), &body[inner_start..inner_end]);
        }
        if close.is_some() {
            builder.token(SyntaxKind::R_BRACE.into(), "}");
            i = inner_end + 1;
        } else {
            i = inner_end;
        }
        builder.finish_node();
        content_start = i;
    }

    flush_content(builder, &body[content_start..]);
}

fn flush_content(builder: &mut GreenNodeBuilder<'static>, text: &str) {
    if !text.is_empty() {
        builder.token(SyntaxKind::STRING_CONTENT.into(), text);
    }
}

/// Index of the `}` closing a region whose opening brace precedes `from`.
fn matching_brace(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, byte) in bytes.iter().enumerate().skip(from) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
