//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode and provides methods to access children.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Check if a syntax node has a direct child token of the specified kind.
#[inline]
fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == kind)
}

/// First direct child token of the specified kind.
#[inline]
fn find_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Trait for typed AST nodes
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    /// Find all descendant nodes of a specific AST type
    fn descendants<T: AstNode>(&self) -> impl Iterator<Item = T> {
        self.syntax().descendants().filter_map(T::cast)
    }
}

macro_rules! ast_node {
    ($name:ident, $($kind:ident)|+) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

macro_rules! first_child_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get the first `", stringify!($type), "` child of this node.")]
        pub fn $name(&self) -> Option<$type> {
            self.0.children().find_map($type::cast)
        }
    };
}

macro_rules! children_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get all `", stringify!($type), "` children of this node.")]
        pub fn $name(&self) -> impl Iterator<Item = $type> + '_ {
            self.0.children().filter_map($type::cast)
        }
    };
}

// ============================================================================
// Root
// ============================================================================

ast_node!(Recipe, RECIPE);

impl Recipe {
    children_method!(assignments, VariableAssignment);
    children_method!(directives, Directive);
    children_method!(shell_functions, ShellFunction);
    children_method!(python_functions, PythonFunction);
    children_method!(def_functions, DefFunction);
    children_method!(export_statements, ExportStatement);
}

// ============================================================================
// Variables
// ============================================================================

ast_node!(VariableAssignment, VARIABLE_ASSIGNMENT);

impl VariableAssignment {
    first_child_method!(name, VariableName);
    children_method!(overrides, Override);
    first_child_method!(flag, VariableFlag);
    first_child_method!(value, StringLiteral);

    pub fn is_exported(&self) -> bool {
        has_token(&self.0, SyntaxKind::EXPORT_KW)
    }

    /// The operator token; absent while the user is still typing the name.
    pub fn operator(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind().is_assignment_operator())
    }

    /// `NAME`, without overrides or flag
    pub fn variable_name(&self) -> Option<String> {
        self.name().map(|n| n.text()).filter(|n| !n.is_empty())
    }
}

ast_node!(VariableName, VARIABLE_NAME);

impl VariableName {
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }
}

ast_node!(Override, OVERRIDE);

impl Override {
    /// Override token without its leading colon
    pub fn name(&self) -> String {
        let text = self.0.text().to_string();
        text.strip_prefix(':').unwrap_or(&text).to_string()
    }
}

ast_node!(VariableFlag, VARIABLE_FLAG);

impl VariableFlag {
    /// Flag name without the brackets
    pub fn name(&self) -> String {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| !matches!(t.kind(), SyntaxKind::L_BRACKET | SyntaxKind::R_BRACKET))
            .map(|t| t.text().to_string())
            .collect()
    }
}

ast_node!(ExportStatement, EXPORT_STATEMENT);

impl ExportStatement {
    first_child_method!(name, VariableName);
}

ast_node!(UnsetStatement, UNSET_STATEMENT);

impl UnsetStatement {
    first_child_method!(name, VariableName);
}

// ============================================================================
// Strings
// ============================================================================

ast_node!(StringLiteral, STRING_LITERAL);

impl StringLiteral {
    children_method!(expansions, VariableExpansion);
    children_method!(inline_python, InlinePython);

    /// Text between the quotes
    pub fn content(&self) -> String {
        self.0
            .children_with_tokens()
            .filter(|e| e.kind() != SyntaxKind::QUOTE)
            .map(|e| e.to_string())
            .collect()
    }

    pub fn is_terminated(&self) -> bool {
        self.0
            .children_with_tokens()
            .filter(|e| e.kind() == SyntaxKind::QUOTE)
            .count()
            == 2
    }
}

ast_node!(VariableExpansion, VARIABLE_EXPANSION);

impl VariableExpansion {
    /// Name between `${` and `}`
    pub fn name(&self) -> Option<String> {
        find_token(&self.0, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }
}

ast_node!(InlinePython, INLINE_PYTHON);

impl InlinePython {
    pub fn code(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::PYTHON_CODE)
    }
}

// ============================================================================
// Directives
// ============================================================================

/// Kind of file-pulling directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Inherit,
    Include,
    Require,
}

impl DirectiveKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DirectiveKind::Inherit => "inherit",
            DirectiveKind::Include => "include",
            DirectiveKind::Require => "require",
        }
    }
}

ast_node!(Directive, INHERIT_DIRECTIVE | INCLUDE_DIRECTIVE | REQUIRE_DIRECTIVE);

impl Directive {
    children_method!(arguments, DirectiveArgument);

    pub fn kind(&self) -> DirectiveKind {
        match self.0.kind() {
            SyntaxKind::INCLUDE_DIRECTIVE => DirectiveKind::Include,
            SyntaxKind::REQUIRE_DIRECTIVE => DirectiveKind::Require,
            _ => DirectiveKind::Inherit,
        }
    }

    /// The keyword token (`inherit`, `inherit_defer`, `include`, `require`)
    pub fn keyword(&self) -> Option<SyntaxToken> {
        self.0.first_token()
    }
}

ast_node!(DirectiveArgument, DIRECTIVE_ARGUMENT);

impl DirectiveArgument {
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }
}

ast_node!(TaskStatement, TASK_STATEMENT);

impl TaskStatement {
    children_method!(arguments, DirectiveArgument);
}

// ============================================================================
// Functions
// ============================================================================

ast_node!(FunctionName, FUNCTION_NAME);

impl FunctionName {
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }
}

ast_node!(FunctionBody, FUNCTION_BODY);

ast_node!(ShellFunction, FUNCTION_DEFINITION);

impl ShellFunction {
    first_child_method!(name, FunctionName);
    children_method!(overrides, Override);
    first_child_method!(body, FunctionBody);

    pub fn is_fakeroot(&self) -> bool {
        has_token(&self.0, SyntaxKind::FAKEROOT_KW)
    }

    /// The closing `}` of the body
    pub fn closing_brace(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::R_BRACE)
    }
}

ast_node!(PythonFunction, PYTHON_FUNCTION);

impl PythonFunction {
    first_child_method!(name, FunctionName);
    children_method!(overrides, Override);
    first_child_method!(body, FunctionBody);

    pub fn python_keyword(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::PYTHON_KW)
    }

    pub fn is_fakeroot(&self) -> bool {
        has_token(&self.0, SyntaxKind::FAKEROOT_KW)
    }

    /// `python () {}` and `python __anonymous () {}` run at parse time
    pub fn is_anonymous(&self) -> bool {
        self.name().is_none_or(|n| n.text() == "__anonymous")
    }

    pub fn opening_brace(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::L_BRACE)
    }

    pub fn closing_brace(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::R_BRACE)
    }
}

ast_node!(DefFunction, DEF_FUNCTION);

impl DefFunction {
    first_child_method!(name, FunctionName);
    first_child_method!(body, FunctionBody);
}
