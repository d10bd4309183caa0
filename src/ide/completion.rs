//! Completion suggestions implementation.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;
use url::Url;

use super::docs::{BITBAKE_OPERATOR, BITBAKE_VARIABLES, DocInfo, DocScanner, RESERVED_KEYWORDS, VARIABLE_FLAGS};
use crate::analyzer::{Analyzer, Symbol, SymbolKind};
use crate::base::Position;
use crate::parser::DirectiveKind;
use crate::project::{ElementInfo, ProjectSnapshot};

/// Override rendered as a variable reference
const DEFAULT_PACKAGE_NAME_OVERRIDE: &str = "pn-defaultpkgname";

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Function,
    Variable,
    Class,
    Interface,
    Property,
    Keyword,
    Snippet,
    Operator,
}

impl From<SymbolKind> for CompletionKind {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Variable => CompletionKind::Variable,
            SymbolKind::Function => CompletionKind::Function,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Documentation (markdown, shown in popup).
    pub documentation: Option<Arc<str>>,
    /// Text to insert (if different from label).
    pub insert_text: Option<Arc<str>>,
    /// Whether `insert_text` is a snippet with tab stops.
    pub is_snippet: bool,
    /// Sort key (if different from label).
    pub sort_text: Option<Arc<str>>,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            insert_text: None,
            is_snippet: false,
            sort_text: None,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the documentation.
    pub fn with_documentation(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    /// Set the insert text.
    pub fn with_insert_text(mut self, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        self.is_snippet = text.contains('$');
        self.insert_text = Some(text);
        self
    }

    /// Set the sort text.
    pub fn with_sort_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.sort_text = Some(text.into());
        self
    }

    /// Create from a documentation entry.
    pub fn from_doc(info: &DocInfo, kind: CompletionKind) -> Self {
        let mut item = Self::new(info.name.as_str(), kind)
            .with_detail(format!("Source: {}", info.source))
            .with_documentation(doc_markdown(&info.definition, info.reference_url.as_deref()));
        if let Some(text) = &info.insert_text {
            item = item.with_insert_text(text.as_str());
        }
        item
    }
}

fn doc_markdown(definition: &str, reference_url: Option<&str>) -> String {
    match reference_url {
        Some(url) => format!("{definition}\n\n[Reference]({url})"),
        None => definition.to_string(),
    }
}

/// Get completion suggestions at a position.
///
/// The character before the cursor decides the context: `:` after a name
/// offers operators and overrides, `[` after a name offers variable flags,
/// a directive line offers classes or include files, anything else offers
/// keywords, variables, task snippets and known symbols.
pub fn completions(analyzer: &Analyzer, docs: &DocScanner, uri: &Url, position: Position) -> Vec<CompletionItem> {
    let Some(document) = analyzer.document(uri) else {
        return Vec::new();
    };
    if position.column == 0 && document.line_text(position.line).is_none_or(|l| l.trim().is_empty()) {
        return Vec::new();
    }

    let word_position = position.step_back(1);
    let word = document.word_at(word_position);
    debug!(word = ?word, "completion context");

    if document.is_string_content(word_position) {
        return Vec::new();
    }

    let is_override = document.is_override(word_position);
    if word.as_deref() == Some(":") || is_override {
        if is_override || document.is_identifier(position.step_back(2)) {
            return override_completions(analyzer.snapshot());
        }
        return Vec::new();
    }

    if word.as_deref() == Some("[") {
        if document.is_identifier(position.step_back(2)) {
            return flag_completions(docs);
        }
        return Vec::new();
    }

    let symbol_items = if word.is_some() {
        symbol_completions(analyzer, docs, uri)
    } else {
        Vec::new()
    };

    if let Some(kind) = document.directive_at_line(position.line) {
        debug!(keyword = kind.keyword(), "completion on directive statement");
        return directive_completions(kind, analyzer.snapshot(), uri);
    }

    let keyword_items: Vec<CompletionItem> = if document.is_variable_expansion(word_position) {
        Vec::new()
    } else {
        RESERVED_KEYWORDS
            .iter()
            .map(|k| CompletionItem::new(*k, CompletionKind::Keyword))
            .collect()
    };

    let mut variable_items: Vec<CompletionItem> = if docs.bitbake_variables.is_empty() {
        BITBAKE_VARIABLES
            .iter()
            .map(|v| CompletionItem::new(*v, CompletionKind::Variable))
            .collect()
    } else {
        docs.bitbake_variables
            .iter()
            .map(|info| CompletionItem::from_doc(info, CompletionKind::Variable))
            .collect()
    };
    let yocto: Vec<CompletionItem> = docs
        .yocto_variables
        .iter()
        .map(|info| CompletionItem::from_doc(info, CompletionKind::Variable))
        .collect();
    variable_items.retain(|item| !yocto.iter().any(|y| y.label == item.label));
    variable_items.extend(yocto);
    variable_items.retain(|item| !symbol_items.iter().any(|s| s.label == item.label));

    let task_items = docs
        .yocto_tasks
        .iter()
        .map(|info| CompletionItem::from_doc(info, CompletionKind::Snippet));

    keyword_items
        .into_iter()
        .chain(variable_items)
        .chain(task_items)
        .chain(symbol_items)
        .collect()
}

/// Operators first, then overrides in snapshot order.
fn override_completions(snapshot: &ProjectSnapshot) -> Vec<CompletionItem> {
    let operators = BITBAKE_OPERATOR
        .iter()
        .map(|op| CompletionItem::new(*op, CompletionKind::Operator));

    let overrides = snapshot.overrides.iter().enumerate().map(|(index, name)| {
        let label = if name == DEFAULT_PACKAGE_NAME_OVERRIDE {
            "${PN}"
        } else {
            name.as_str()
        };
        let rank = char::from_u32(21 + index as u32).unwrap_or(char::MAX);
        CompletionItem::new(label, CompletionKind::Property).with_sort_text(format!("~{rank}{label}"))
    });

    operators.chain(overrides).collect()
}

fn flag_completions(docs: &DocScanner) -> Vec<CompletionItem> {
    if docs.variable_flags.is_empty() {
        VARIABLE_FLAGS
            .iter()
            .map(|f| CompletionItem::new(*f, CompletionKind::Keyword))
            .collect()
    } else {
        docs.variable_flags
            .iter()
            .map(|info| CompletionItem::from_doc(info, CompletionKind::Keyword))
            .collect()
    }
}

/// Declarations of the document itself and of the files it pulls in.
fn symbol_completions(analyzer: &Analyzer, docs: &DocScanner, uri: &Url) -> Vec<CompletionItem> {
    let fallback: FxHashSet<&str> = BITBAKE_VARIABLES.iter().copied().collect();
    let local = analyzer
        .global_declaration_symbols(uri)
        .into_iter()
        .filter(|symbol| !fallback.contains(symbol.name.as_str()))
        .map(|symbol| {
            CompletionItem::new(symbol.name.as_str(), symbol.kind.into()).with_documentation(symbol.name.as_str())
        });

    let document_path = uri.to_file_path().unwrap_or_default();
    let extra = analyzer
        .extra_symbols_for_uri(uri)
        .into_iter()
        .map(|symbol| extra_symbol_item(symbol, &document_path, docs));

    local.chain(extra).collect()
}

/// A declaration from another file, labelled with where it comes from.
fn extra_symbol_item(symbol: &Symbol, document_path: &Path, docs: &DocScanner) -> CompletionItem {
    let info = docs.variable_info(&symbol.name);
    let source = symbol.location.uri.to_file_path().unwrap_or_default();
    let mut item = CompletionItem::new(symbol.name.as_str(), symbol.kind.into())
        .with_detail(relative_path(document_path, &source).to_string_lossy().into_owned())
        .with_documentation(info.map_or_else(String::new, |i| {
            doc_markdown(&i.definition, i.reference_url.as_deref())
        }));
    if let Some(text) = info.and_then(|i| i.insert_text.as_deref()) {
        item = item.with_insert_text(text);
    }
    item
}

/// Classes for `inherit`, include files for `include` and `require`.
///
/// Candidates living next to the current document are moved to the front.
fn directive_completions(kind: DirectiveKind, snapshot: &ProjectSnapshot, uri: &Url) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = match kind {
        DirectiveKind::Inherit => snapshot
            .classes
            .iter()
            .map(|class| element_item(class, CompletionKind::Class, None))
            .collect(),
        DirectiveKind::Include | DirectiveKind::Require => snapshot
            .includes
            .iter()
            .map(|include| element_item(include, CompletionKind::Interface, include.layer_relative_path()))
            .collect(),
    };

    let segments: Vec<&str> = uri.path().split('/').collect();
    let is_near = |item: &CompletionItem| {
        let Some(insert) = item.insert_text.as_deref() else {
            return false;
        };
        let stem = |s: &str| s.split('.').next().unwrap_or_default().to_string();
        if stem(insert) == stem(&item.label) {
            return false;
        }
        let first = insert.split('/').next().unwrap_or_default();
        segments.contains(&first)
    };
    items.sort_by_key(|item| !is_near(item));
    items
}

fn element_item(element: &ElementInfo, kind: CompletionKind, file_path: Option<String>) -> CompletionItem {
    let is_include = element.path.as_ref().is_some_and(|p| p.ext == ".inc");
    let label = if is_include {
        format!("{}.inc", element.name)
    } else {
        element.name.clone()
    };
    let file_type = match kind {
        CompletionKind::Class => "bbclass",
        _ => "inc",
    };
    let mut item = CompletionItem::new(label, kind)
        .with_detail(file_path.clone().unwrap_or_else(|| file_type.to_string()))
        .with_insert_text(file_path.unwrap_or_else(|| element.name.clone()));
    if let Some(extra) = &element.extra_info {
        item = item.with_documentation(extra.as_str());
    }
    item
}

/// Path of `to` as seen from the file `from`, `..` steps included.
fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut path = PathBuf::new();
    for _ in common..from.len() {
        path.push("..");
    }
    for component in &to[common..] {
        path.push(component.as_os_str());
    }
    path
}
