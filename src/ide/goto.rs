//! Go-to-definition implementation.

use std::path::Path;

use tracing::debug;
use url::Url;

use crate::analyzer::{AnalyzedDocument, Analyzer, Location, Symbol};
use crate::base::text_utils::{char_index_at_utf16, extract_symbol_from_line};
use crate::base::{Position, Span};
use crate::parser::{AstNode, Directive, DirectiveKind};
use crate::project::{ProjectSnapshot, search};

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub uri: Url,
    pub span: Span,
}

impl GotoTarget {
    /// Start of `path`, used when the target is a whole file.
    pub fn file(path: &Path) -> Option<Self> {
        let uri = Url::from_file_path(path).ok()?;
        Some(Self {
            uri,
            span: Span::file_start(),
        })
    }
}

impl From<&Location> for GotoTarget {
    fn from(location: &Location) -> Self {
        Self {
            uri: location.uri.clone(),
            span: location.span,
        }
    }
}

/// Find the definition of whatever is under the cursor.
///
/// Directive arguments lead to class and include files, `file://` sources
/// to the first file of that name below `source_search_root` (the document's
/// folder when unset), anything else is looked up as a symbol. The result is
/// empty rather than absent when nothing matches.
pub fn goto_definition(
    analyzer: &Analyzer,
    source_search_root: Option<&Path>,
    uri: &Url,
    position: Position,
) -> Vec<GotoTarget> {
    let Some(document) = analyzer.document(uri) else {
        debug!(%uri, "definition requested for an unknown document");
        return Vec::new();
    };

    if let Some(directive) = document.directive_at(position) {
        return directive_definition(document, &directive, position, analyzer.snapshot());
    }

    if let Some(reference) = document.source_reference_at(position) {
        let root = source_search_root
            .map(Path::to_path_buf)
            .or_else(|| document_dir(uri));
        let Some(root) = root else {
            return Vec::new();
        };
        return search::find_file_named(&root, &reference.name)
            .and_then(|path| GotoTarget::file(&path))
            .into_iter()
            .collect();
    }

    let Some(line) = document.line_text(position.line) else {
        return Vec::new();
    };
    let symbol = extract_symbol_from_line(line, char_index_at_utf16(line, position.column));
    debug!(symbol, "definition for symbol");
    definition_for_symbol(analyzer, uri, &symbol)
}

/// Files named by the directive argument under the cursor, or by the first
/// argument when the cursor is on the keyword.
fn directive_definition(
    document: &AnalyzedDocument,
    directive: &Directive,
    position: Position,
    snapshot: &ProjectSnapshot,
) -> Vec<GotoTarget> {
    let offset = document.offset(position);
    let arguments: Vec<String> = directive.arguments().map(|a| a.text()).collect();
    let target = directive
        .arguments()
        .find(|a| offset.is_some_and(|o| a.syntax().text_range().contains_inclusive(o)))
        .map(|a| a.text())
        .or_else(|| arguments.first().cloned());
    let Some(target) = target else {
        return Vec::new();
    };
    definition_for_directive(directive.kind(), &target, document.uri(), snapshot)
}

/// Files a directive with argument `target` pulls in.
pub fn definition_for_directive(
    kind: DirectiveKind,
    target: &str,
    uri: &Url,
    snapshot: &ProjectSnapshot,
) -> Vec<GotoTarget> {
    if target.contains("${") {
        return Vec::new();
    }
    match kind {
        DirectiveKind::Inherit => snapshot
            .class(target)
            .and_then(|class| class.file_path())
            .and_then(|path| GotoTarget::file(&path))
            .into_iter()
            .collect(),
        DirectiveKind::Include | DirectiveKind::Require => {
            let known: Vec<GotoTarget> = snapshot
                .files_ending_with(target)
                .filter_map(|element| element.file_path())
                .filter_map(|path| GotoTarget::file(&path))
                .collect();
            if !known.is_empty() {
                return known;
            }
            document_dir(uri)
                .map(|dir| dir.join(target))
                .filter(|path| path.is_file())
                .and_then(|path| GotoTarget::file(&path))
                .into_iter()
                .collect()
        }
    }
}

/// Declarations named `symbol`: in the document, then in the files it pulls
/// in, then recipes of that name with their append files.
pub fn definition_for_symbol(analyzer: &Analyzer, uri: &Url, symbol: &str) -> Vec<GotoTarget> {
    // `do_install:append()` is declared as `do_install`
    let name = symbol
        .split(':')
        .next()
        .unwrap_or(symbol)
        .trim_end_matches("()");
    if name.is_empty() {
        return Vec::new();
    }

    let matching = |symbols: Vec<&Symbol>| -> Vec<GotoTarget> {
        symbols
            .into_iter()
            .filter(|s| s.name == name)
            .map(|s| GotoTarget::from(&s.location))
            .collect()
    };

    let local = matching(analyzer.global_declaration_symbols(uri));
    if !local.is_empty() {
        return local;
    }
    let extra = matching(analyzer.extra_symbols_for_uri(uri));
    if !extra.is_empty() {
        return extra;
    }

    let Some(recipe) = analyzer.snapshot().recipe(name) else {
        return Vec::new();
    };
    let appends = recipe.appends.iter().flatten().map(|append| append.to_path_buf());
    recipe
        .file_path()
        .into_iter()
        .chain(appends)
        .filter_map(|path| GotoTarget::file(&path))
        .collect()
}

fn document_dir(uri: &Url) -> Option<std::path::PathBuf> {
    uri.to_file_path().ok()?.parent().map(Path::to_path_buf)
}
