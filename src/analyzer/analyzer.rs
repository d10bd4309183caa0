//! The analyzer: per-document models, the dependency queue and recipe scan
//! results.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, error};
use url::Url;

use super::dependencies::resolve_dependencies;
use super::document::{AnalyzedDocument, Diagnostic};
use super::error::AnalysisError;
use super::scan_results::RecipeScanResult;
use super::symbols::{Symbol, SymbolTable, extract_symbols};
use crate::base::LineIndex;
use crate::parser::{AstNode, Parse, Recipe, parse};
use crate::project::ProjectSnapshot;

/// Owns the semantic model of every analyzed document.
///
/// Documents are analyzed on open and change (forced), and when another
/// document pulls them in through a directive (not forced). Dependencies that
/// were never analyzed are queued once and drained by the caller with
/// [`Analyzer::pop_pending_dependency`].
#[derive(Debug, Default)]
pub struct Analyzer {
    documents: FxHashMap<Url, AnalyzedDocument>,
    pending: VecDeque<Url>,
    queued: FxHashSet<Url>,
    snapshot: Arc<ProjectSnapshot>,
    scan_results: FxHashMap<String, RecipeScanResult>,
    recipe_local_files: FxHashMap<Url, Vec<String>>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project data used to resolve directive targets
    pub fn set_snapshot(&mut self, snapshot: Arc<ProjectSnapshot>) {
        self.snapshot = snapshot;
    }

    pub fn snapshot(&self) -> &Arc<ProjectSnapshot> {
        &self.snapshot
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Analyze `text` unconditionally, unless a newer version is already
    /// stored. Returns the diagnostics of the document.
    pub fn analyze(&mut self, uri: &Url, text: &str, version: i32) -> Vec<Diagnostic> {
        self.analyze_with_policy(uri, text, version, true)
            .unwrap_or_default()
    }

    /// Analyze `text` if the policy allows it.
    ///
    /// A stored model is never replaced by an older version. Without `force`
    /// an empty text, or a version not newer than the stored one, is skipped.
    /// Returns `None` when nothing was analyzed.
    pub fn analyze_with_policy(&mut self, uri: &Url, text: &str, version: i32, force: bool) -> Option<Vec<Diagnostic>> {
        let previous = self.documents.get(uri).map(AnalyzedDocument::version);
        if previous.is_some_and(|stored| stored > version) {
            debug!(%uri, version, "discarding analysis of a superseded version");
            return None;
        }
        if !force && (text.is_empty() || previous.is_some_and(|stored| stored >= version)) {
            debug!(%uri, version, "document is already analyzed");
            return None;
        }

        let document = self.build_document(uri, text, version);
        let diagnostics = document.diagnostics.clone();
        for dependency in &document.dependencies {
            self.enqueue(dependency);
        }
        self.documents.insert(uri.clone(), document);
        Some(diagnostics)
    }

    fn build_document(&self, uri: &Url, text: &str, version: i32) -> AnalyzedDocument {
        let line_index = LineIndex::new(text);
        let parsed = match parse_document(uri, text) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!(error = %err, "document degraded to an empty model");
                return AnalyzedDocument {
                    uri: uri.clone(),
                    version,
                    text: text.to_string(),
                    line_index,
                    green: parse("").green,
                    symbols: SymbolTable::new(),
                    dependencies: Vec::new(),
                    diagnostics: Vec::new(),
                };
            }
        };

        let root = parsed.syntax();
        let symbols = extract_symbols(&root, text, &line_index, uri);
        let dependencies = Recipe::cast(root)
            .map(|recipe| resolve_dependencies(&recipe, uri, &self.snapshot))
            .unwrap_or_default();
        let diagnostics = parsed
            .errors
            .iter()
            .map(|err| Diagnostic {
                span: line_index.span(text, err.range),
                message: err.message.clone(),
            })
            .collect();

        AnalyzedDocument {
            uri: uri.clone(),
            version,
            text: text.to_string(),
            line_index,
            green: parsed.green,
            symbols,
            dependencies,
            diagnostics,
        }
    }

    /// Queue a dependency that was never analyzed, at most once.
    fn enqueue(&mut self, uri: &Url) {
        if self.documents.contains_key(uri) || !self.queued.insert(uri.clone()) {
            return;
        }
        debug!(%uri, "queued dependency for analysis");
        self.pending.push_back(uri.clone());
    }

    /// Next dependency waiting for analysis, oldest first
    pub fn pop_pending_dependency(&mut self) -> Option<Url> {
        let uri = self.pending.pop_front()?;
        self.queued.remove(&uri);
        Some(uri)
    }

    // =========================================================================
    // Documents
    // =========================================================================

    pub fn document(&self, uri: &Url) -> Option<&AnalyzedDocument> {
        self.documents.get(uri)
    }

    pub fn require_document(&self, uri: &Url) -> Result<&AnalyzedDocument, AnalysisError> {
        self.documents
            .get(uri)
            .ok_or_else(|| AnalysisError::DocumentNotFound(uri.clone()))
    }

    pub fn documents(&self) -> impl Iterator<Item = &AnalyzedDocument> {
        self.documents.values()
    }

    /// Drop the model of a closed document and what was cached for it.
    /// Documents that depend on it queue it again on their next analysis.
    pub fn remove_document(&mut self, uri: &Url) -> Option<AnalyzedDocument> {
        self.recipe_local_files.remove(uri);
        self.documents.remove(uri)
    }

    /// Move every piece of per-document state from `old` to `new`.
    pub fn rename_document(&mut self, old: &Url, new: &Url) {
        if let Some(mut document) = self.documents.remove(old) {
            document.uri = new.clone();
            for symbol in document.symbols.values_mut() {
                symbol.location.uri = new.clone();
            }
            self.documents.insert(new.clone(), document);
        }
        for document in self.documents.values_mut() {
            for dependency in document.dependencies.iter_mut().filter(|d| &**d == old) {
                *dependency = new.clone();
            }
        }
        if let Some(files) = self.recipe_local_files.remove(old) {
            self.recipe_local_files.insert(new.clone(), files);
        }
        if self.queued.remove(old) {
            self.queued.insert(new.clone());
            for queued in self.pending.iter_mut().filter(|q| &**q == old) {
                *queued = new.clone();
            }
        }
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    /// Global declarations of `uri`
    pub fn global_declaration_symbols(&self, uri: &Url) -> Vec<&Symbol> {
        self.documents
            .get(uri)
            .map(|d| d.symbols.values().collect())
            .unwrap_or_default()
    }

    /// Declarations contributed by the documents `uri` pulls in, directly or
    /// through other dependencies. Each symbol keeps the location of the
    /// dependency that declares it.
    pub fn extra_symbols_for_uri(&self, uri: &Url) -> Vec<&Symbol> {
        let mut symbols = Vec::new();
        let mut visited: FxHashSet<&Url> = FxHashSet::default();
        visited.insert(uri);

        let mut stack: Vec<&Url> = self
            .documents
            .get(uri)
            .map(|d| d.dependencies.iter().rev().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(document) = self.documents.get(current) else {
                continue;
            };
            symbols.extend(document.symbols.values());
            stack.extend(document.dependencies.iter().rev());
        }
        symbols
    }

    // =========================================================================
    // Recipe scan results
    // =========================================================================

    /// Record the environment dump of `recipe`, replacing any earlier one.
    pub fn process_recipe_scan_results(&mut self, uri: &Url, recipe: &str, output: &str) {
        let result = RecipeScanResult::from_output(uri, recipe, output);
        debug!(recipe, symbols = result.symbols.len(), "recorded recipe scan result");
        self.scan_results.insert(recipe.to_string(), result);
    }

    pub fn last_scan_result(&self, recipe: &str) -> Option<&RecipeScanResult> {
        self.scan_results.get(recipe)
    }

    pub fn remove_last_scan_result(&mut self, recipe: &str) {
        self.scan_results.remove(recipe);
    }

    // =========================================================================
    // Recipe local files
    // =========================================================================

    /// Files next to the recipe, as reported by the client. `None` means
    /// the client was never asked.
    pub fn recipe_local_files(&self, uri: &Url) -> Option<&[String]> {
        self.recipe_local_files.get(uri).map(Vec::as_slice)
    }

    pub fn set_recipe_local_files(&mut self, uri: &Url, files: Vec<String>) {
        self.recipe_local_files.insert(uri.clone(), files);
    }

    /// Forget every list, e.g. after files were created or deleted
    pub fn clear_recipe_local_files(&mut self) {
        self.recipe_local_files.clear();
    }
}

/// Parse `text`, turning a parser panic into an error.
fn parse_document(uri: &Url, text: &str) -> Result<Parse, AnalysisError> {
    panic::catch_unwind(AssertUnwindSafe(|| parse(text))).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        AnalysisError::ParseFailure {
            uri: uri.clone(),
            message,
        }
    })
}
