//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines every token and node kind in a BitBake syntax tree.
//! Recipe (`.bb`), append (`.bbappend`), class (`.bbclass`), include (`.inc`)
//! and configuration (`.conf`) files all share the same grammar.

/// All syntax kinds (tokens and nodes) of the BitBake language
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (assignments, directives, function definitions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,      // # comment
    LINE_CONTINUATION, // backslash followed by a newline
    NEWLINE,           // statements are line oriented, so this is not trivia

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,  // DESCRIPTION, do_install, class-target, 1.2.3
    STRING, // "value" or 'value', split into pieces inside assignments

    // =========================================================================
    // STRING PIECES
    // =========================================================================
    QUOTE,          // opening or closing quote of a value
    STRING_CONTENT, // literal text between expansions
    PYTHON_CODE,    // body of an inline python expansion

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,          // {
    R_BRACE,          // }
    L_BRACKET,        // [
    R_BRACKET,        // ]
    L_PAREN,          // (
    R_PAREN,          // )
    COLON,            // :
    DOLLAR,           // $
    DOLLAR_L_BRACE,   // ${
    DOLLAR_L_BRACE_AT, // ${@
    PUNCT,            // any other single character (shell and python bodies)

    // =========================================================================
    // ASSIGNMENT OPERATORS
    // =========================================================================
    EQ,                   // =
    COLON_EQ,             // :=
    QUESTION_EQ,          // ?=
    QUESTION_QUESTION_EQ, // ??=
    PLUS_EQ,              // +=
    EQ_PLUS,              // =+
    DOT_EQ,               // .=
    EQ_DOT,               // =.

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    INHERIT_KW,
    INHERIT_DEFER_KW,
    INCLUDE_KW,
    REQUIRE_KW,
    EXPORT_KW,
    UNSET_KW,
    PYTHON_KW,
    DEF_KW,
    FAKEROOT_KW,
    ADDTASK_KW,
    DELTASK_KW,
    ADDHANDLER_KW,
    EXPORT_FUNCTIONS_KW,

    // =========================================================================
    // NODES
    // =========================================================================
    RECIPE,              // root of every file
    VARIABLE_ASSIGNMENT, // [export] NAME[:override]*[flag] op "value"
    VARIABLE_NAME,
    OVERRIDE,            // :append, :class-target, :${PN}
    VARIABLE_FLAG,       // [doc]
    STRING_LITERAL,
    UNQUOTED_VALUE,
    VARIABLE_EXPANSION,  // ${NAME}
    INLINE_PYTHON,       // ${@ code }
    EXPORT_STATEMENT,    // export NAME
    UNSET_STATEMENT,     // unset NAME[flag]
    INHERIT_DIRECTIVE,
    INCLUDE_DIRECTIVE,
    REQUIRE_DIRECTIVE,
    DIRECTIVE_ARGUMENT,
    TASK_STATEMENT,      // addtask, deltask, addhandler, EXPORT_FUNCTIONS
    FUNCTION_DEFINITION, // [fakeroot] name() { shell }
    PYTHON_FUNCTION,     // [fakeroot] python [name]() { python }
    DEF_FUNCTION,        // def name(args): python
    FUNCTION_NAME,
    PARAMETER_LIST,
    FUNCTION_BODY,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is trivia (whitespace, comment or line continuation)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::LINE_CONTINUATION
        )
    }

    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::INHERIT_KW as u16)
            && (self as u16) <= (Self::EXPORT_FUNCTIONS_KW as u16)
    }

    /// Check if this is one of the eight assignment operators
    pub fn is_assignment_operator(self) -> bool {
        (self as u16) >= (Self::EQ as u16) && (self as u16) <= (Self::EQ_DOT as u16)
    }

    /// Check if a token of this kind can be part of a variable name or override
    pub fn is_name_part(self) -> bool {
        matches!(self, Self::IDENT | Self::DOLLAR_L_BRACE | Self::PUNCT) || self.is_keyword()
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // SAFETY: SyntaxKind is repr(u16) and the value was bounds checked above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BitbakeLanguage {}

impl rowan::Language for BitbakeLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<BitbakeLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<BitbakeLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<BitbakeLanguage>;
