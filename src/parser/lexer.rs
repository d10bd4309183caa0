//! Logos-based lexer for BitBake
//!
//! Every byte of the input ends up in exactly one token, so the tree built
//! from these tokens is lossless.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
    pending: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
            pending: None,
        }
    }

    fn raw_next(&mut self) -> Option<Token<'a>> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }

    /// `FOO.=` lexes as the name `FOO.` followed by `=`. Give the dot back to
    /// the operator.
    fn split_dot_eq(&mut self, name: Token<'a>) -> Token<'a> {
        let remainder = self.inner.remainder();
        let is_plain_eq = remainder.starts_with('=') && !remainder.starts_with("=+") && !remainder.starts_with("=.");
        if !is_plain_eq || name.text.len() < 2 {
            return name;
        }
        let Some(eq) = self.raw_next() else {
            return name;
        };
        let dot = name.text.len() - 1;
        let start = usize::from(name.offset) + dot;
        let end = usize::from(eq.offset) + eq.text.len();
        self.pending = Some(Token {
            kind: SyntaxKind::DOT_EQ,
            text: &self.inner.source()[start..end],
            offset: name.offset + TextSize::new(dot as u32),
        });
        Token {
            kind: SyntaxKind::IDENT,
            text: &name.text[..dot],
            offset: name.offset,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        let token = self.raw_next()?;
        if token.kind == SyntaxKind::IDENT && token.text.ends_with('.') {
            return Some(self.split_dot_eq(token));
        }
        Some(token)
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"#[^\r\n]*")]
    LineComment,

    #[regex(r"\\\r?\n")]
    LineContinuation,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z0-9_][A-Za-z0-9_\-.~]*")]
    Ident,

    #[regex(r#""([^"\\\r\n]|\\[^\r\n]|\\\r?\n)*""#)]
    #[regex(r#"'([^'\\\r\n]|\\[^\r\n]|\\\r?\n)*'"#)]
    String,

    // A quote that never closes on its line
    #[token("\"")]
    #[token("'")]
    Quote,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token("$")]
    Dollar,
    #[token("${")]
    DollarLBrace,
    #[token("${@")]
    DollarLBraceAt,

    #[token("?")]
    #[token("+")]
    #[token(".")]
    #[token("\\")]
    #[regex(r#"[^ \t\nA-Za-z0-9_"'{}\[\]():$#\\=?+.]"#)]
    Punct,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    #[token("=")]
    Eq,
    #[token(":=")]
    ColonEq,
    #[token("?=")]
    QuestionEq,
    #[token("??=")]
    QuestionQuestionEq,
    #[token("+=")]
    PlusEq,
    #[token("=+")]
    EqPlus,
    #[token(".=")]
    DotEq,
    #[token("=.")]
    EqDot,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("inherit")]
    InheritKw,
    #[token("inherit_defer")]
    InheritDeferKw,
    #[token("include")]
    IncludeKw,
    #[token("require")]
    RequireKw,
    #[token("export")]
    ExportKw,
    #[token("unset")]
    UnsetKw,
    #[token("python")]
    PythonKw,
    #[token("def")]
    DefKw,
    #[token("fakeroot")]
    FakerootKw,
    #[token("addtask")]
    AddtaskKw,
    #[token("deltask")]
    DeltaskKw,
    #[token("addhandler")]
    AddhandlerKw,
    #[token("EXPORT_FUNCTIONS")]
    ExportFunctionsKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::Newline => SyntaxKind::NEWLINE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::LineContinuation => SyntaxKind::LINE_CONTINUATION,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::Quote => SyntaxKind::QUOTE,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Dollar => SyntaxKind::DOLLAR,
            LogosToken::DollarLBrace => SyntaxKind::DOLLAR_L_BRACE,
            LogosToken::DollarLBraceAt => SyntaxKind::DOLLAR_L_BRACE_AT,
            LogosToken::Punct => SyntaxKind::PUNCT,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::ColonEq => SyntaxKind::COLON_EQ,
            LogosToken::QuestionEq => SyntaxKind::QUESTION_EQ,
            LogosToken::QuestionQuestionEq => SyntaxKind::QUESTION_QUESTION_EQ,
            LogosToken::PlusEq => SyntaxKind::PLUS_EQ,
            LogosToken::EqPlus => SyntaxKind::EQ_PLUS,
            LogosToken::DotEq => SyntaxKind::DOT_EQ,
            LogosToken::EqDot => SyntaxKind::EQ_DOT,
            LogosToken::InheritKw => SyntaxKind::INHERIT_KW,
            LogosToken::InheritDeferKw => SyntaxKind::INHERIT_DEFER_KW,
            LogosToken::IncludeKw => SyntaxKind::INCLUDE_KW,
            LogosToken::RequireKw => SyntaxKind::REQUIRE_KW,
            LogosToken::ExportKw => SyntaxKind::EXPORT_KW,
            LogosToken::UnsetKw => SyntaxKind::UNSET_KW,
            LogosToken::PythonKw => SyntaxKind::PYTHON_KW,
            LogosToken::DefKw => SyntaxKind::DEF_KW,
            LogosToken::FakerootKw => SyntaxKind::FAKEROOT_KW,
            LogosToken::AddtaskKw => SyntaxKind::ADDTASK_KW,
            LogosToken::DeltaskKw => SyntaxKind::DELTASK_KW,
            LogosToken::AddhandlerKw => SyntaxKind::ADDHANDLER_KW,
            LogosToken::ExportFunctionsKw => SyntaxKind::EXPORT_FUNCTIONS_KW,
        }
    }
}
