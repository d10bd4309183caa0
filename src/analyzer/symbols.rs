//! Global declarations of a recipe.
//!
//! Variables come from assignments and `export` statements, functions from
//! shell, python and `def` definitions. A name is unique per document: a later
//! declaration replaces an earlier one in place.

use indexmap::IndexMap;
use url::Url;

use crate::base::{LineIndex, Span};
use crate::parser::{
    AstNode, DefFunction, ExportStatement, PythonFunction, ShellFunction, SyntaxKind, SyntaxNode,
    VariableAssignment, WalkControl, walk,
};

/// Kind of a global declaration. Classes are files found by the project
/// scan, so `inherit` only references them and declares nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
}

impl SymbolKind {
    pub fn display(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Function => "function",
        }
    }
}

/// A span inside a specific document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub uri: Url,
    pub span: Span,
}

impl Location {
    pub fn new(uri: Url, span: Span) -> Self {
        Self { uri, span }
    }
}

/// A global declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Range of the whole declaring statement
    pub location: Location,
    /// Value resolved by a recipe scan, if one ran
    pub final_value: Option<String>,
}

/// Declarations keyed by name, in first-declaration order
pub type SymbolTable = IndexMap<String, Symbol>;

/// Collect the global declarations of a parsed recipe.
pub fn extract_symbols(root: &SyntaxNode, text: &str, line_index: &LineIndex, uri: &Url) -> SymbolTable {
    let mut table = SymbolTable::new();
    let mut declare = |name: String, kind: SymbolKind, node: &SyntaxNode| {
        let location = Location::new(uri.clone(), line_index.span(text, node.text_range()));
        table.insert(
            name.clone(),
            Symbol {
                name,
                kind,
                location,
                final_value: None,
            },
        );
    };

    walk(root, |node| match node.kind() {
        SyntaxKind::RECIPE => WalkControl::Continue,
        SyntaxKind::VARIABLE_ASSIGNMENT => {
            if let Some(assignment) = VariableAssignment::cast(node.clone()) {
                // A bare name still being typed is not a declaration yet.
                if let (Some(name), Some(_)) = (assignment.variable_name(), assignment.operator()) {
                    declare(name, SymbolKind::Variable, node);
                }
            }
            WalkControl::SkipChildren
        }
        SyntaxKind::EXPORT_STATEMENT => {
            if let Some(name) = ExportStatement::cast(node.clone()).and_then(|e| e.name()) {
                declare(name.text(), SymbolKind::Variable, node);
            }
            WalkControl::SkipChildren
        }
        SyntaxKind::FUNCTION_DEFINITION => {
            if let Some(name) = ShellFunction::cast(node.clone()).and_then(|f| f.name()) {
                declare(name.text(), SymbolKind::Function, node);
            }
            WalkControl::SkipChildren
        }
        SyntaxKind::PYTHON_FUNCTION => {
            if let Some(function) = PythonFunction::cast(node.clone()) {
                if !function.is_anonymous() {
                    if let Some(name) = function.name() {
                        declare(name.text(), SymbolKind::Function, node);
                    }
                }
            }
            WalkControl::SkipChildren
        }
        SyntaxKind::DEF_FUNCTION => {
            if let Some(name) = DefFunction::cast(node.clone()).and_then(|f| f.name()) {
                declare(name.text(), SymbolKind::Function, node);
            }
            WalkControl::SkipChildren
        }
        _ => WalkControl::SkipChildren,
    });

    table
}
