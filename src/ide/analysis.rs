//! AnalysisHost and Analysis: unified state for IDE features.
//!
//! The `AnalysisHost` owns the analyzer, the documentation tables and the
//! resolution settings. Requests borrow an `Analysis` and query through it,
//! so every answer of one request sees the same state.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! host.analyze(&uri, text, 1, true);
//!
//! let analysis = host.analysis();
//! let hover = analysis.hover(&uri, position);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::analyzer::{AnalyzedDocument, Analyzer, Diagnostic};
use crate::base::{Position, Span};
use crate::embedded::{EmbeddedLanguage, embedded_language_at, synthesize};
use crate::project::ProjectSnapshot;

use super::docs::DocScanner;
use super::{CompletionItem, DocumentLink, GotoTarget, HoverResult, RenameEdit};

/// Owns all mutable state for the IDE layer.
#[derive(Debug, Default)]
pub struct AnalysisHost {
    analyzer: Analyzer,
    docs: DocScanner,
    source_search_root: Option<PathBuf>,
}

impl AnalysisHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn analyzer_mut(&mut self) -> &mut Analyzer {
        &mut self.analyzer
    }

    pub fn docs(&self) -> &DocScanner {
        &self.docs
    }

    /// Replace the documentation tables, e.g. after the docs path changed.
    pub fn set_docs(&mut self, docs: DocScanner) {
        self.docs = docs;
    }

    /// Where `file://` sources are searched for go-to-definition
    pub fn set_source_search_root(&mut self, root: Option<PathBuf>) {
        self.source_search_root = root;
    }

    pub fn set_snapshot(&mut self, snapshot: Arc<ProjectSnapshot>) {
        self.analyzer.set_snapshot(snapshot);
    }

    /// Analyze a document. See [`Analyzer::analyze_with_policy`].
    pub fn analyze(&mut self, uri: &Url, text: &str, version: i32, force: bool) -> Option<Vec<Diagnostic>> {
        self.analyzer.analyze_with_policy(uri, text, version, force)
    }

    /// Forget a document the client closed.
    pub fn close(&mut self, uri: &Url) -> bool {
        self.analyzer.remove_document(uri).is_some()
    }

    pub fn pop_pending_dependency(&mut self) -> Option<Url> {
        self.analyzer.pop_pending_dependency()
    }

    /// Get a consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis {
            analyzer: &self.analyzer,
            docs: &self.docs,
            source_search_root: self.source_search_root.as_deref(),
        }
    }
}

/// An immutable view of the analysis state.
///
/// All IDE queries go through this struct to ensure consistent results.
#[derive(Clone, Copy)]
pub struct Analysis<'a> {
    analyzer: &'a Analyzer,
    docs: &'a DocScanner,
    source_search_root: Option<&'a Path>,
}

impl<'a> Analysis<'a> {
    // ==================== Requests ====================

    pub fn completions(&self, uri: &Url, position: Position) -> Vec<CompletionItem> {
        super::completions(self.analyzer, self.docs, uri, position)
    }

    pub fn goto_definition(&self, uri: &Url, position: Position) -> Vec<GotoTarget> {
        super::goto_definition(self.analyzer, self.source_search_root, uri, position)
    }

    pub fn hover(&self, uri: &Url, position: Position) -> Option<HoverResult> {
        super::hover(self.analyzer, self.docs, uri, position)
    }

    pub fn prepare_rename(&self, uri: &Url, position: Position) -> Option<(String, Span)> {
        super::prepare_rename(self.document(uri)?, position)
    }

    pub fn rename(&self, uri: &Url, position: Position, new_name: &str) -> Vec<RenameEdit> {
        self.document(uri)
            .map(|document| super::rename(document, position, new_name))
            .unwrap_or_default()
    }

    pub fn document_links(&self, uri: &Url) -> Vec<DocumentLink> {
        super::document_links(self.analyzer, uri)
    }

    // ==================== Embedded languages ====================

    pub fn embedded_language_at(&self, uri: &Url, position: Position) -> Option<EmbeddedLanguage> {
        embedded_language_at(self.document(uri)?, position)
    }

    /// The `language` view of a document, `None` when it was never analyzed
    pub fn embedded_text(&self, uri: &Url, language: EmbeddedLanguage) -> Option<String> {
        Some(synthesize(self.document(uri)?, language))
    }

    // ==================== Accessors ====================

    pub fn document(&self, uri: &Url) -> Option<&'a AnalyzedDocument> {
        self.analyzer.document(uri)
    }

    pub fn analyzer(&self) -> &'a Analyzer {
        self.analyzer
    }
}
