//! Shell view of a recipe: every shell function, headers cleaned up.

use super::edits::EmbeddedBuffer;
use crate::parser::{SyntaxKind, SyntaxNode, WalkControl, walk};

pub(super) fn collect(root: &SyntaxNode, buffer: &mut EmbeddedBuffer<'_>) {
    walk(root, |node| match node.kind() {
        SyntaxKind::RECIPE => WalkControl::Continue,
        SyntaxKind::FUNCTION_DEFINITION => {
            shell_function(node, buffer);
            WalkControl::SkipChildren
        }
        _ => WalkControl::SkipChildren,
    });
}

fn shell_function(node: &SyntaxNode, buffer: &mut EmbeddedBuffer<'_>) {
    buffer.copy(node.text_range());
    for element in node.children_with_tokens() {
        match element.kind() {
            SyntaxKind::FAKEROOT_KW | SyntaxKind::OVERRIDE => buffer.blank(element.text_range()),
            // `do_install_${PN}()` is not a valid shell name
            SyntaxKind::FUNCTION_NAME => {
                if let Some(name) = element.as_node() {
                    name.children()
                        .filter(|n| n.kind() == SyntaxKind::VARIABLE_EXPANSION)
                        .for_each(|n| buffer.blank(n.text_range()));
                }
            }
            _ => {}
        }
    }
}
