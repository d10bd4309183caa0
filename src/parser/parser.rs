//! Recursive descent parser for BitBake
//!
//! Builds a rowan GreenNode tree from tokens.
//! Statements are line oriented: every top-level construct ends at a newline,
//! except function bodies which run until a `}` in column 0 and `def`
//! functions which run while lines stay indented.

use super::lexer::{Lexer, Token};
use super::strings::lower_string;
use super::syntax_kind::SyntaxKind;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse BitBake source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    parser.parse_recipe();
    parser.finish()
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn kind_at(&self, idx: usize) -> Option<SyntaxKind> {
        self.tokens.get(idx).map(|t| t.kind)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current_kind() == kind
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at_line_end(&self) -> bool {
        self.at_eof() || self.current_kind() == SyntaxKind::NEWLINE
    }

    fn at_trivia(&self) -> bool {
        !self.at_eof() && self.current_kind().is_trivia()
    }

    fn at_name_part(&self) -> bool {
        !self.at_eof() && self.current_kind().is_name_part()
    }

    /// True when the current token is the first one on its line.
    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.kind_at(self.pos - 1) == Some(SyntaxKind::NEWLINE)
    }

    /// Scan the rest of the line to decide between `name() {` and `NAME = "…"`.
    fn line_has_function_header(&self) -> bool {
        let mut idx = self.pos;
        while let Some(kind) = self.kind_at(idx) {
            match kind {
                SyntaxKind::NEWLINE => return false,
                SyntaxKind::L_PAREN => return true,
                SyntaxKind::L_BRACKET | SyntaxKind::STRING | SyntaxKind::QUOTE => return false,
                k if k.is_assignment_operator() => return false,
                _ => idx += 1,
            }
        }
        false
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    fn skip_trivia(&mut self) {
        while self.at_trivia() {
            self.bump();
        }
    }

    /// Consume everything up to (not including) the newline, reporting
    /// anything that is not trivia.
    fn finish_line(&mut self) {
        self.skip_trivia();
        if !self.at_line_end() {
            self.error("unexpected input at end of statement");
            while !self.at_line_end() {
                self.bump();
            }
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .or_else(|| {
                self.tokens
                    .last()
                    .map(|t| TextRange::empty(t.offset + TextSize::of(t.text)))
            })
            .unwrap_or_else(|| TextRange::empty(TextSize::new(0)));
        self.errors.push(SyntaxError::new(message, range));
    }

    /// Wrap the rest of the line in an ERROR node
    fn error_recover_line(&mut self, message: impl Into<String>) {
        self.error(message);
        self.start_node(SyntaxKind::ERROR);
        while !self.at_line_end() {
            self.bump();
        }
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_recipe(&mut self) {
        self.start_node(SyntaxKind::RECIPE);
        while !self.at_eof() {
            if self.at(SyntaxKind::NEWLINE) || self.at_trivia() {
                self.bump();
                continue;
            }
            let before = self.pos;
            self.parse_statement();
            if self.pos == before {
                // Guarantee progress on anything the statement rules rejected.
                self.error_recover_line("unexpected token");
                if self.pos == before {
                    self.bump();
                }
            }
        }
        self.finish_node();
    }

    fn parse_statement(&mut self) {
        match self.current_kind() {
            SyntaxKind::EXPORT_KW => self.parse_assignment_or(SyntaxKind::EXPORT_STATEMENT),
            SyntaxKind::UNSET_KW => self.parse_unset(),
            SyntaxKind::INHERIT_KW | SyntaxKind::INHERIT_DEFER_KW => {
                self.parse_directive(SyntaxKind::INHERIT_DIRECTIVE, "a class name")
            }
            SyntaxKind::INCLUDE_KW => self.parse_directive(SyntaxKind::INCLUDE_DIRECTIVE, "a file path"),
            SyntaxKind::REQUIRE_KW => self.parse_directive(SyntaxKind::REQUIRE_DIRECTIVE, "a file path"),
            SyntaxKind::ADDTASK_KW
            | SyntaxKind::DELTASK_KW
            | SyntaxKind::ADDHANDLER_KW
            | SyntaxKind::EXPORT_FUNCTIONS_KW => self.parse_task_statement(),
            SyntaxKind::DEF_KW => self.parse_def_function(),
            SyntaxKind::PYTHON_KW | SyntaxKind::FAKEROOT_KW => self.parse_function(),
            k if k.is_name_part() => {
                if self.line_has_function_header() {
                    self.parse_function()
                } else {
                    self.parse_assignment_or(SyntaxKind::VARIABLE_ASSIGNMENT)
                }
            }
            _ => self.error_recover_line("expected a variable assignment, directive or function"),
        }
    }

    /// `[export] NAME[:override]*[flag] op value`
    ///
    /// Without an operator the node becomes `fallback`; for a bare name that is
    /// still an assignment, but with an error attached.
    fn parse_assignment_or(&mut self, fallback: SyntaxKind) {
        let checkpoint = self.builder.checkpoint();
        if self.eat(SyntaxKind::EXPORT_KW) {
            self.skip_trivia();
        }

        if self.at_name_part() {
            self.parse_variable_target();
        } else {
            self.error("expected a variable name");
        }
        self.skip_trivia();

        if self.current_kind().is_assignment_operator() && !self.at_eof() {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::VARIABLE_ASSIGNMENT.into());
            self.bump();
            self.skip_trivia();
            self.parse_value();
        } else {
            self.builder.start_node_at(checkpoint, fallback.into());
            if fallback == SyntaxKind::VARIABLE_ASSIGNMENT {
                self.error("expected an assignment operator");
            }
        }
        self.finish_line();
        self.finish_node();
    }

    /// Variable name, overrides and an optional flag.
    fn parse_variable_target(&mut self) {
        self.start_node(SyntaxKind::VARIABLE_NAME);
        self.parse_name_parts();
        self.finish_node();
        self.parse_overrides();

        if self.at(SyntaxKind::L_BRACKET) {
            self.start_node(SyntaxKind::VARIABLE_FLAG);
            self.bump();
            while self.at_name_part() || self.at(SyntaxKind::COLON) {
                self.bump();
            }
            self.expect(SyntaxKind::R_BRACKET, "`]`");
            self.finish_node();
        }
    }

    fn parse_overrides(&mut self) {
        while self.at(SyntaxKind::COLON) {
            self.start_node(SyntaxKind::OVERRIDE);
            self.bump();
            self.parse_name_parts();
            self.finish_node();
        }
    }

    /// Contiguous identifier pieces, e.g. `RDEPENDS_${PN}-dev`.
    fn parse_name_parts(&mut self) {
        loop {
            if self.at(SyntaxKind::DOLLAR_L_BRACE) {
                self.parse_expansion_in_name();
            } else if self.at_name_part() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn parse_expansion_in_name(&mut self) {
        self.start_node(SyntaxKind::VARIABLE_EXPANSION);
        self.bump();
        while !self.at_line_end() && !self.at_trivia() && !self.at(SyntaxKind::R_BRACE) {
            self.bump();
        }
        self.expect(SyntaxKind::R_BRACE, "`}`");
        self.finish_node();
    }

    fn parse_value(&mut self) {
        match self.current_kind() {
            _ if self.at_line_end() => self.error("expected a value"),
            SyntaxKind::STRING => {
                if let Some(text) = self.tokens.get(self.pos).map(|t| t.text) {
                    lower_string(&mut self.builder, text);
                    self.pos += 1;
                }
            }
            SyntaxKind::QUOTE => {
                // Unterminated: the rest of the line is the string body.
                self.error("unterminated string");
                let start = self.pos;
                while !self.at_line_end() {
                    self.pos += 1;
                }
                let text: String = self.tokens[start..self.pos].iter().map(|t| t.text).collect();
                lower_string(&mut self.builder, &text);
            }
            _ => {
                self.error("expected a quoted value");
                self.start_node(SyntaxKind::UNQUOTED_VALUE);
                while !self.at_line_end() && !self.at(SyntaxKind::LINE_COMMENT) {
                    self.bump();
                }
                self.finish_node();
            }
        }
    }

    fn parse_unset(&mut self) {
        self.start_node(SyntaxKind::UNSET_STATEMENT);
        self.bump();
        self.skip_trivia();
        if self.at_name_part() {
            self.parse_variable_target();
        } else {
            self.error("expected a variable name");
        }
        self.finish_line();
        self.finish_node();
    }

    /// Keyword followed by whitespace separated arguments until end of line.
    fn parse_arguments(&mut self) -> usize {
        let mut count = 0;
        loop {
            self.skip_trivia();
            if self.at_line_end() {
                break;
            }
            self.start_node(SyntaxKind::DIRECTIVE_ARGUMENT);
            while !self.at_line_end() && !self.at_trivia() {
                self.bump();
            }
            self.finish_node();
            count += 1;
        }
        count
    }

    fn parse_directive(&mut self, kind: SyntaxKind, what: &str) {
        self.start_node(kind);
        self.bump();
        if self.parse_arguments() == 0 {
            self.error(format!("expected {what}"));
        }
        self.finish_node();
    }

    fn parse_task_statement(&mut self) {
        self.start_node(SyntaxKind::TASK_STATEMENT);
        self.bump();
        if self.parse_arguments() == 0 {
            self.error("expected a task or function name");
        }
        self.finish_node();
    }

    /// `[fakeroot] [python] [name[:override]*] () { body }`
    fn parse_function(&mut self) {
        let checkpoint = self.builder.checkpoint();
        if self.eat(SyntaxKind::FAKEROOT_KW) {
            self.skip_trivia();
        }
        let kind = if self.eat(SyntaxKind::PYTHON_KW) {
            self.skip_trivia();
            SyntaxKind::PYTHON_FUNCTION
        } else {
            SyntaxKind::FUNCTION_DEFINITION
        };
        self.builder.start_node_at(checkpoint, kind.into());

        if self.at_name_part() {
            self.start_node(SyntaxKind::FUNCTION_NAME);
            self.parse_name_parts();
            self.finish_node();
            self.parse_overrides();
        } else if kind == SyntaxKind::FUNCTION_DEFINITION {
            self.error("expected a function name");
        }
        self.skip_trivia();

        if self.at(SyntaxKind::L_PAREN) {
            self.start_node(SyntaxKind::PARAMETER_LIST);
            self.bump();
            self.skip_trivia();
            self.expect(SyntaxKind::R_PAREN, "`)`");
            self.finish_node();
        } else {
            self.error("expected `(`");
        }
        self.skip_trivia();

        if self.eat(SyntaxKind::L_BRACE) {
            self.parse_brace_body();
        } else {
            self.error("expected `{`");
            while !self.at_line_end() {
                self.bump();
            }
        }
        self.finish_node();
    }

    fn parse_brace_body(&mut self) {
        self.start_node(SyntaxKind::FUNCTION_BODY);
        loop {
            if self.at_eof() {
                self.error("unterminated function body, expected `}` in column 0");
                break;
            }
            if self.at(SyntaxKind::R_BRACE) && self.at_line_start() {
                break;
            }
            self.bump();
        }
        self.finish_node();
        self.eat(SyntaxKind::R_BRACE);
        self.finish_line();
    }

    /// `def name(args):` followed by indented lines
    fn parse_def_function(&mut self) {
        self.start_node(SyntaxKind::DEF_FUNCTION);
        self.bump();
        self.skip_trivia();
        if self.at_name_part() {
            self.start_node(SyntaxKind::FUNCTION_NAME);
            self.bump();
            self.finish_node();
        } else {
            self.error("expected a function name");
        }
        while !self.at_line_end() {
            self.bump();
        }

        let mut in_body = false;
        while self.at(SyntaxKind::NEWLINE) && self.next_line_continues_def() {
            if !in_body {
                self.start_node(SyntaxKind::FUNCTION_BODY);
                in_body = true;
            }
            self.bump();
            while !self.at_line_end() {
                self.bump();
            }
        }
        if in_body {
            self.finish_node();
        }
        self.finish_node();
    }

    /// An indented or blank line after a newline keeps a `def` body open.
    fn next_line_continues_def(&self) -> bool {
        match self.kind_at(self.pos + 1) {
            Some(SyntaxKind::WHITESPACE) => true,
            Some(SyntaxKind::NEWLINE) => {
                // A blank line only counts when more indented code follows.
                let mut idx = self.pos + 1;
                while self.kind_at(idx) == Some(SyntaxKind::NEWLINE) {
                    idx += 1;
                }
                self.kind_at(idx) == Some(SyntaxKind::WHITESPACE)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxNode;

    fn kinds_of(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_parse_empty() {
        let parse = parse("");
        assert!(parse.ok());
        assert_eq!(parse.syntax().kind(), SyntaxKind::RECIPE);
    }

    #[test]
    fn test_parse_is_lossless() {
        let input = "SUMMARY = \"x\"\ninherit autotools\ndo_install() {\n\techo\n}\n# done\n";
        assert_eq!(parse(input).syntax().text().to_string(), input);
    }

    #[test]
    fn test_parse_assignment() {
        let parse = parse("DESCRIPTION = \"hello\"\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(kinds_of(&parse.syntax()), vec![SyntaxKind::VARIABLE_ASSIGNMENT]);
    }

    #[test]
    fn test_parse_export_without_value() {
        let parse = parse("export PATH\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(kinds_of(&parse.syntax()), vec![SyntaxKind::EXPORT_STATEMENT]);
    }

    #[test]
    fn test_parse_export_assignment() {
        let parse = parse("export CC = \"gcc\"\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(kinds_of(&parse.syntax()), vec![SyntaxKind::VARIABLE_ASSIGNMENT]);
    }

    #[test]
    fn test_parse_bare_name_reports_error() {
        let parse = parse("DESC\n");
        assert!(!parse.ok());
        assert_eq!(kinds_of(&parse.syntax()), vec![SyntaxKind::VARIABLE_ASSIGNMENT]);
    }

    #[test]
    fn test_parse_unterminated_string() {
        let parse = parse("FOO = \"${BA\n");
        assert!(!parse.ok());
        let root = parse.syntax();
        assert!(root.descendants().any(|n| n.kind() == SyntaxKind::VARIABLE_EXPANSION));
        assert_eq!(root.text().to_string(), "FOO = \"${BA\n");
    }

    #[test]
    fn test_parse_shell_function() {
        let parse = parse("do_install:append() {\n\tinstall -d ${D}\n}\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(kinds_of(&parse.syntax()), vec![SyntaxKind::FUNCTION_DEFINITION]);
    }

    #[test]
    fn test_parse_body_closes_at_column_zero() {
        let parse = parse("do_x() {\n    if true; then { echo; }\n    fi\n}\nA = \"1\"\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(
            kinds_of(&parse.syntax()),
            vec![SyntaxKind::FUNCTION_DEFINITION, SyntaxKind::VARIABLE_ASSIGNMENT]
        );
    }

    #[test]
    fn test_parse_anonymous_python() {
        let parse = parse("python () {\n    d.setVar('A', '1')\n}\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(kinds_of(&parse.syntax()), vec![SyntaxKind::PYTHON_FUNCTION]);
    }

    #[test]
    fn test_parse_def_function_stops_at_dedent() {
        let parse = parse("def helper(d):\n    return 1\n\n    pass\nA = \"1\"\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(
            kinds_of(&parse.syntax()),
            vec![SyntaxKind::DEF_FUNCTION, SyntaxKind::VARIABLE_ASSIGNMENT]
        );
    }

    #[test]
    fn test_parse_unterminated_body() {
        let parse = parse("do_x() {\n  echo\n");
        assert!(!parse.ok());
        assert_eq!(kinds_of(&parse.syntax()), vec![SyntaxKind::FUNCTION_DEFINITION]);
    }

    #[test]
    fn test_parse_recovers_on_next_line() {
        let parse = parse("} oops\nA = \"1\"\n");
        assert_eq!(parse.errors.len(), 1);
        assert_eq!(
            kinds_of(&parse.syntax()),
            vec![SyntaxKind::ERROR, SyntaxKind::VARIABLE_ASSIGNMENT]
        );
    }
}
