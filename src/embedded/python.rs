//! Python view of a recipe.
//!
//! `python` functions become `def`s, `def` functions are copied as they are
//! and assignments holding `${@ … }` become f-string assignments, so a python
//! language server sees every inline expression at its original position.

use rowan::{TextRange, TextSize};

use super::edits::{EmbeddedBuffer, TextEdit};
use crate::parser::{AstNode, PythonFunction, SyntaxKind, SyntaxNode, VariableAssignment, WalkControl, walk};

pub(super) fn collect(root: &SyntaxNode, buffer: &mut EmbeddedBuffer<'_>) {
    walk(root, |node| {
        match node.kind() {
            SyntaxKind::RECIPE => return WalkControl::Continue,
            SyntaxKind::PYTHON_FUNCTION => {
                if let Some(function) = PythonFunction::cast(node.clone()) {
                    python_function(&function, buffer);
                }
            }
            SyntaxKind::DEF_FUNCTION => buffer.copy(node.text_range()),
            SyntaxKind::VARIABLE_ASSIGNMENT => {
                if let Some(assignment) = VariableAssignment::cast(node.clone()) {
                    inline_python_assignment(&assignment, buffer);
                }
            }
            _ => {}
        }
        WalkControl::SkipChildren
    });
}

/// `[fakeroot] python [name]() {` becomes `def [name]():` with the body left
/// in place.
fn python_function(function: &PythonFunction, buffer: &mut EmbeddedBuffer<'_>) {
    let node = function.syntax();
    let Some(keyword) = function.python_keyword() else {
        return;
    };
    buffer.copy(node.text_range());

    // The header is rewritten from the start of the line so that a leading
    // `fakeroot` does not indent the `def`.
    let header = TextRange::new(node.text_range().start(), keyword.text_range().end());
    let def = if function.name().is_some() { "def" } else { "def _" };
    buffer.edit(TextEdit::substitute(header, pad(def, &buffer.source()[header])));

    for element in node.children_with_tokens() {
        match element.kind() {
            SyntaxKind::OVERRIDE => buffer.blank(element.text_range()),
            SyntaxKind::L_BRACE => buffer.edit(TextEdit::substitute(element.text_range(), ":")),
            SyntaxKind::R_BRACE => buffer.edit(TextEdit::substitute(element.text_range(), " ")),
            _ => {}
        }
    }
}

/// `NAME op "… ${@ code } …"` becomes `NAME = f"""… {  code } …"""`.
fn inline_python_assignment(assignment: &VariableAssignment, buffer: &mut EmbeddedBuffer<'_>) {
    let Some(literal) = assignment.value() else {
        return;
    };
    if literal.inline_python().next().is_none() || !literal.is_terminated() {
        return;
    }
    let node = assignment.syntax();
    buffer.copy(node.text_range());

    let mut elements = node.children_with_tokens().peekable();
    while let Some(element) = elements.next() {
        let range = element.text_range();
        match element.kind() {
            SyntaxKind::EXPORT_KW => {
                // Drop `export ` entirely: blanking it would indent the line.
                let mut end = range.end();
                while let Some(next) = elements.peek().filter(|e| e.kind() == SyntaxKind::WHITESPACE) {
                    end = next.text_range().end();
                    elements.next();
                }
                buffer.edit(TextEdit::rewrite(TextRange::new(range.start(), end), ""));
            }
            SyntaxKind::OVERRIDE | SyntaxKind::VARIABLE_FLAG => buffer.blank(range),
            SyntaxKind::VARIABLE_NAME => {
                if let Some(name) = element.as_node() {
                    name.children()
                        .filter(|n| n.kind() == SyntaxKind::VARIABLE_EXPANSION)
                        .for_each(|n| buffer.blank(n.text_range()));
                }
            }
            kind if kind.is_assignment_operator() => {
                let source = &buffer.source()[range];
                buffer.edit(TextEdit::substitute(range, pad("=", source)));
            }
            _ => {}
        }
    }

    let mut quotes = 0;
    for element in literal.syntax().children_with_tokens() {
        let range = element.text_range();
        match element.kind() {
            SyntaxKind::QUOTE => {
                let quote = element.to_string();
                let replacement = if quotes == 0 {
                    format!("f{}", quote.repeat(3))
                } else {
                    quote.repeat(3)
                };
                buffer.edit(TextEdit::rewrite(range, replacement));
                quotes += 1;
            }
            SyntaxKind::INLINE_PYTHON => {
                if let Some(marker) = element
                    .as_node()
                    .and_then(|n| n.first_token())
                    .filter(|t| t.kind() == SyntaxKind::DOLLAR_L_BRACE_AT)
                {
                    buffer.edit(TextEdit::substitute(marker.text_range(), "{  "));
                }
            }
            SyntaxKind::STRING_CONTENT => {
                let text = element.to_string();
                let start = range.start();
                for (idx, _) in text.match_indices("\\\n") {
                    let at = start + TextSize::from(idx as u32);
                    buffer.edit(TextEdit::rewrite(TextRange::at(at, TextSize::from(1)), ""));
                }
            }
            _ => {}
        }
    }
}

/// `text` followed by spaces up to the UTF-16 width of `original`
fn pad(text: &str, original: &str) -> String {
    let width = original.encode_utf16().count();
    let mut out = text.to_string();
    while out.encode_utf16().count() < width {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedded::EmbeddedLanguage;
    use crate::parser::parse;

    fn python(source: &str) -> String {
        let root = parse(source).syntax();
        let mut buffer = EmbeddedBuffer::new(source);
        collect(&root, &mut buffer);
        buffer.finish(EmbeddedLanguage::Python.preamble())
    }

    #[test]
    fn test_named_python_function() {
        let out = python("python do_x() {\n    bb.note('x')\n}\n");
        assert_eq!(out, "import bb\ndef    do_x() :\n    bb.note('x')\n \n");
    }

    #[test]
    fn test_anonymous_python_function() {
        let out = python("python () {\n    pass\n}\n");
        assert_eq!(out, "import bb\ndef _  () :\n    pass\n \n");
    }

    #[test]
    fn test_fakeroot_and_override_are_removed() {
        let out = python("fakeroot python do_x:append() {\n    pass\n}\n");
        assert_eq!(out, "import bb\ndef             do_x       () :\n    pass\n \n");
    }

    #[test]
    fn test_def_function_copied_verbatim() {
        let source = "A = \"1\"\ndef helper(d):\n    return d\n";
        let out = python(source);
        assert_eq!(out, "import bb\n       \ndef helper(d):\n    return d\n");
    }

    #[test]
    fn test_inline_python_assignment() {
        let out = python("export FOO:append ?= \"a ${@d.getVar('B')} c\"\n");
        assert_eq!(out, "import bb\nFOO        =  f\"\"\"a {  d.getVar('B')} c\"\"\"\n");
    }

    #[test]
    fn test_plain_assignments_and_shell_are_blank() {
        let out = python("A = \"${B}\"\ndo_x() {\n\techo\n}\n");
        assert!(out.trim().split_whitespace().eq(["import", "bb"]));
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_unterminated_literal_is_skipped() {
        let out = python("A = \"${@x}\n");
        assert_eq!(out, "import bb\n          \n");
    }

    #[test]
    fn test_line_continuation_in_value() {
        let out = python("A = \"${@x} \\\n b\"\n");
        assert_eq!(out, "import bb\nA = f\"\"\"{  x} \n b\"\"\"\n");
    }
}
