//! The language server state and its LSP handlers.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

use super::convert;
use super::protocol::{
    EmbeddedLanguageDocInfo, EmbeddedLanguageDocInfosParams, EmbeddedLanguageDocs, EmbeddedLanguageTypeOnPositionParams,
    FilenameChangedParams, GetAllVarParams, GetLinksInDocumentParams, GetRecipeLocalFiles, GetVarParams,
    ProcessRecipeScanResultsParams, RecipeLocalFilesParams, RemoveScanResultParams, ScanCompleteParams, VariableValue,
};
use crate::embedded::{EmbeddedDocument, EmbeddedDocumentStore, EmbeddedLanguage};
use crate::ide::{AnalysisHost, DocScanner};
use crate::project::{BitbakeDriver, ProjectScanner, ProjectSnapshot, RawSettings, ScanEvent, Settings};

/// Version given to documents read from disk rather than sent by the client
const DISK_VERSION: i32 = 0;

/// BitBake language server.
pub struct Backend {
    state: Arc<ServerState>,
}

/// Everything the handlers share, owned for the whole session.
struct ServerState {
    client: Client,
    host: RwLock<AnalysisHost>,
    scanner: ProjectScanner<BitbakeDriver>,
    settings: RwLock<Settings>,
    workspace_folder: RwLock<PathBuf>,
    store: RwLock<Option<Arc<EmbeddedDocumentStore>>>,
    /// Document last analyzed on behalf of the client
    active: RwLock<Option<Url>>,
    embedded_jobs: UnboundedSender<EmbeddedJob>,
    /// Taken by the writer task once the session is initialized
    embedded_queue: Mutex<Option<UnboundedReceiver<EmbeddedJob>>>,
}

/// Disk work on synthetic documents, done in the order it was queued
enum EmbeddedJob {
    Save {
        store: Arc<EmbeddedDocumentStore>,
        uri: Url,
        views: Vec<(EmbeddedLanguage, String)>,
    },
    Remove {
        store: Arc<EmbeddedDocumentStore>,
        uri: Url,
    },
}

impl Backend {
    pub fn new(client: Client) -> Self {
        let (embedded_jobs, embedded_queue) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(ServerState {
                client,
                host: RwLock::new(AnalysisHost::new()),
                scanner: ProjectScanner::new(None),
                settings: RwLock::new(Settings::default()),
                workspace_folder: RwLock::new(PathBuf::new()),
                store: RwLock::new(None),
                active: RwLock::new(None),
                embedded_jobs,
                embedded_queue: Mutex::new(Some(embedded_queue)),
            }),
        }
    }

    // ==================== Custom methods ====================

    pub async fn scan_complete(&self, snapshot: ScanCompleteParams) {
        info!(recipes = snapshot.recipes.len(), "scan results received from the client");
        self.state.scanner.publish(snapshot);
    }

    pub async fn rescan_project(&self) {
        self.state.spawn_rescan();
    }

    pub async fn process_recipe_scan_results(&self, params: ProcessRecipeScanResultsParams) -> Result<()> {
        debug!(uri = %params.uri, recipe = %params.chosen_recipe, "process recipe scan results");
        self.state
            .host
            .write()
            .await
            .analyzer_mut()
            .process_recipe_scan_results(&params.uri, &params.chosen_recipe, &params.scan_results);
        self.state.reanalyze_active().await;
        Ok(())
    }

    pub async fn get_var(&self, params: GetVarParams) -> Result<Option<String>> {
        let host = self.state.host.read().await;
        Ok(host
            .analyzer()
            .last_scan_result(&params.recipe)
            .and_then(|result| result.value(&params.variable))
            .map(str::to_string))
    }

    pub async fn get_all_var(&self, params: GetAllVarParams) -> Result<Option<Vec<VariableValue>>> {
        let host = self.state.host.read().await;
        Ok(host.analyzer().last_scan_result(&params.recipe).map(|result| {
            result
                .values()
                .map(|(name, value)| VariableValue {
                    name: name.to_string(),
                    value: value.map(str::to_string),
                })
                .collect()
        }))
    }

    pub async fn remove_scan_result(&self, params: RemoveScanResultParams) {
        debug!(recipe = %params.recipe_name, "remove scan result");
        self.state
            .host
            .write()
            .await
            .analyzer_mut()
            .remove_last_scan_result(&params.recipe_name);
    }

    pub async fn embedded_language_type_on_position(
        &self,
        params: EmbeddedLanguageTypeOnPositionParams,
    ) -> Result<Option<EmbeddedLanguage>> {
        let position = convert::position(params.position);
        let host = self.state.host.read().await;
        Ok(host.analysis().embedded_language_at(&params.uri_string, position))
    }

    pub async fn embedded_language_doc_infos(
        &self,
        params: EmbeddedLanguageDocInfosParams,
    ) -> Result<Option<EmbeddedLanguageDocInfo>> {
        let store = self.state.store.read().await.clone();
        Ok(store
            .and_then(|store| store.get(&params.uri_string, params.embedded_language_type))
            .map(doc_info))
    }

    pub async fn filename_changed(&self, params: FilenameChangedParams) {
        let FilenameChangedParams { old_uri, new_uri } = params;
        debug!(%old_uri, %new_uri, "filename changed");
        self.state
            .host
            .write()
            .await
            .analyzer_mut()
            .rename_document(&old_uri, &new_uri);
        if let Some(store) = self.state.store.read().await.clone() {
            store.rename(&old_uri, &new_uri);
        }
        let mut active = self.state.active.write().await;
        if active.as_ref() == Some(&old_uri) {
            *active = Some(new_uri);
        }
    }

    pub async fn links_in_document(&self, params: GetLinksInDocumentParams) -> Result<Vec<DocumentLink>> {
        let host = self.state.host.read().await;
        Ok(host
            .analysis()
            .document_links(&params.document_uri)
            .into_iter()
            .map(convert::document_link)
            .collect())
    }
}

impl ServerState {
    /// Install new settings: driver, documentation, search root and storage.
    /// Returns whether anything changed.
    async fn apply_settings(&self, settings: Settings) -> bool {
        if *self.settings.read().await == settings {
            return false;
        }
        self.scanner.set_runner(BitbakeDriver::from_settings(&settings));
        self.scanner.set_should_deep_examine(settings.should_deep_examine);
        self.scanner.reset_notifications();

        let docs = settings
            .docs_path
            .as_deref()
            .map(DocScanner::scan)
            .unwrap_or_default();
        {
            let mut host = self.host.write().await;
            host.set_docs(docs);
            host.set_source_search_root(settings.source_search_root.clone());
        }

        let store = settings
            .storage_path
            .as_deref()
            .map(|path| Arc::new(EmbeddedDocumentStore::new(path)));
        let root = store.as_ref().map(|store| store.root().to_path_buf());
        let previous = std::mem::replace(&mut *self.store.write().await, store);
        if let Some(previous) = previous.filter(|previous| Some(previous.root()) != root.as_deref()) {
            if let Err(err) = previous.cleanup().await {
                warn!(error = %err, "could not remove previous embedded documents");
            }
        }

        *self.settings.write().await = settings;
        true
    }

    fn spawn_rescan(self: &Arc<Self>) {
        let state = Arc::clone(self);
        tokio::spawn(async move { state.scanner.rescan().await });
    }

    /// Forward scanner events until the session ends.
    fn spawn_scan_listener(self: &Arc<Self>) {
        let state = Arc::clone(self);
        let mut events = self.scanner.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ScanEvent::Started) => debug!("project scan started"),
                    Ok(ScanEvent::Ready(snapshot)) => state.on_snapshot(snapshot).await,
                    Ok(ScanEvent::ToolNotConfigured) => {
                        state
                            .client
                            .show_message(
                                MessageType::WARNING,
                                "BitBake could not be found. Set 'pathToBitbakeFolder' to enable project scanning.",
                            )
                            .await
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed scan events"),
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    async fn on_snapshot(&self, snapshot: Arc<ProjectSnapshot>) {
        self.host.write().await.set_snapshot(snapshot);
        debug!("analyzing the current document again");
        self.reanalyze_active().await;
    }

    /// Force a new analysis of the active document against the current state.
    async fn reanalyze_active(&self) {
        let Some(uri) = self.active.read().await.clone() else {
            return;
        };
        let current = {
            let host = self.host.read().await;
            host.analyzer()
                .document(&uri)
                .map(|document| (document.text().to_string(), document.version()))
        };
        if let Some((text, version)) = current {
            self.analyze_with_dependencies(&uri, &text, version, true).await;
        }
    }

    /// Analyze a document, then every dependency it pulls in, one at a time.
    async fn analyze_with_dependencies(&self, uri: &Url, text: &str, version: i32, force: bool) {
        self.analyze_document(uri, text, version, force).await;

        loop {
            let next = self.host.write().await.pop_pending_dependency();
            let Some(dependency) = next else {
                break;
            };
            let Ok(path) = dependency.to_file_path() else {
                continue;
            };
            match tokio::fs::read_to_string(&path).await {
                // Dependencies are never forced: one that is already analyzed
                // at a current version is skipped.
                Ok(text) => self.analyze_document(&dependency, &text, DISK_VERSION, false).await,
                Err(err) => debug!(uri = %dependency, error = %err, "dependency could not be read"),
            }
        }

        *self.active.write().await = Some(uri.clone());
    }

    async fn analyze_document(&self, uri: &Url, text: &str, version: i32, force: bool) {
        let diagnostics = self.host.write().await.analyze(uri, text, version, force);
        let Some(diagnostics) = diagnostics else {
            return;
        };
        self.publish_embedded_documents(uri).await;

        let diagnostics = diagnostics.into_iter().map(convert::diagnostic).collect();
        self.client.publish_diagnostics(uri.clone(), diagnostics, None).await;
    }

    /// Regenerate the synthetic views of `uri`. Files are written by the
    /// writer task so analysis never waits on the disk.
    async fn publish_embedded_documents(&self, uri: &Url) {
        let Some(store) = self.store.read().await.clone() else {
            return;
        };
        let views: Vec<(EmbeddedLanguage, String)> = {
            let host = self.host.read().await;
            let analysis = host.analysis();
            EmbeddedLanguage::ALL
                .into_iter()
                .filter_map(|language| analysis.embedded_text(uri, language).map(|text| (language, text)))
                .collect()
        };
        self.queue_embedded(EmbeddedJob::Save {
            store,
            uri: uri.clone(),
            views,
        });
    }

    fn queue_embedded(&self, job: EmbeddedJob) {
        if self.embedded_jobs.send(job).is_err() {
            warn!("embedded document writer has stopped");
        }
    }

    /// Write synthetic documents until the session ends.
    fn spawn_embedded_writer(&self) {
        let Some(jobs) = self.embedded_queue.lock().take() else {
            return;
        };
        let client = self.client.clone();
        tokio::spawn(drain_embedded_jobs(jobs, move |infos| {
            let client = client.clone();
            async move {
                client.send_notification::<EmbeddedLanguageDocs>(infos).await;
            }
        }));
    }

    /// Ask the client once per recipe which local files `SRC_URI` can use.
    async fn fetch_recipe_local_files(&self, uri: &Url) {
        let known = self.host.read().await.analyzer().recipe_local_files(uri).is_some();
        if known {
            return;
        }
        let Ok(path) = uri.to_file_path() else {
            return;
        };
        let params = RecipeLocalFilesParams {
            uri: path.to_string_lossy().into_owned(),
        };
        match self.client.send_request::<GetRecipeLocalFiles>(params).await {
            Ok(files) => self.host.write().await.analyzer_mut().set_recipe_local_files(uri, files),
            // Plain LSP clients do not implement the request.
            Err(err) => error!(%uri, error = %err, "error while getting recipe local files"),
        }
    }

    async fn load_settings(&self, value: Option<&serde_json::Value>) -> bool {
        let folder = self.workspace_folder.read().await.clone();
        let settings = match value {
            Some(value) => match Settings::from_json(value, &folder) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!(error = %err, "invalid settings, keeping defaults");
                    Settings::resolve(&RawSettings::default(), &folder)
                }
            },
            None => Settings::resolve(&RawSettings::default(), &folder),
        };
        self.apply_settings(settings).await
    }
}

/// Run queued jobs in order until every sender is gone. `announce` receives
/// the documents written by each save.
async fn drain_embedded_jobs<F, Fut>(mut jobs: UnboundedReceiver<EmbeddedJob>, mut announce: F)
where
    F: FnMut(Vec<EmbeddedLanguageDocInfo>) -> Fut,
    Fut: Future<Output = ()>,
{
    while let Some(job) = jobs.recv().await {
        match job {
            EmbeddedJob::Save { store, uri, views } => {
                let infos = save_views(&store, &uri, views).await;
                if !infos.is_empty() {
                    announce(infos).await;
                }
            }
            EmbeddedJob::Remove { store, uri } => {
                let removed = store.remove(&uri).await;
                debug!(%uri, removed = removed.len(), "removed embedded documents");
            }
        }
    }
}

async fn save_views(
    store: &EmbeddedDocumentStore,
    uri: &Url,
    views: Vec<(EmbeddedLanguage, String)>,
) -> Vec<EmbeddedLanguageDocInfo> {
    let mut infos = Vec::with_capacity(views.len());
    for (language, text) in views {
        match store.save(uri, language, &text).await {
            Ok(document) => infos.push(doc_info(document)),
            Err(err) => error!(%uri, language = language.tag(), error = %err, "failed to save embedded document"),
        }
    }
    infos
}

fn doc_info(document: EmbeddedDocument) -> EmbeddedLanguageDocInfo {
    EmbeddedLanguageDocInfo {
        original_uri: document.original_uri,
        embedded_language_type: document.language,
        uri: document.uri,
        line_offset: document.line_offset,
    }
}

fn file_operation_registration() -> FileOperationRegistrationOptions {
    FileOperationRegistrationOptions {
        filters: vec![FileOperationFilter {
            scheme: Some("file".to_string()),
            pattern: FileOperationPattern {
                glob: "**/*".to_string(),
                matches: None,
                options: None,
            },
        }],
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("initializing BitBake language server");

        let folder = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|folder| folder.uri.to_file_path().ok())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();
        *self.state.workspace_folder.write().await = folder;
        self.state
            .load_settings(params.initialization_options.as_ref())
            .await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![":".to_string(), "[".to_string()]),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: Default::default(),
                })),
                document_link_provider: Some(DocumentLinkOptions {
                    resolve_provider: Some(false),
                    work_done_progress_options: Default::default(),
                }),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: None,
                    file_operations: Some(WorkspaceFileOperationsServerCapabilities {
                        did_create: Some(file_operation_registration()),
                        did_rename: Some(file_operation_registration()),
                        did_delete: Some(file_operation_registration()),
                        ..Default::default()
                    }),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "bitbake-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("BitBake language server initialized");
        self.state.spawn_embedded_writer();
        self.state.spawn_scan_listener();
        self.state.spawn_rescan();
    }

    async fn shutdown(&self) -> Result<()> {
        info!("shutting down BitBake language server");
        let store = self.state.store.read().await.clone();
        if let Some(store) = store {
            if let Err(err) = store.cleanup().await {
                warn!(error = %err, "could not remove embedded documents");
            }
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        debug!(uri = %document.uri, "document opened");
        self.state
            .analyze_with_dependencies(&document.uri, &document.text, document.version, true)
            .await;
        self.state.fetch_recipe_local_files(&document.uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(%uri, "document changed");
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.state
            .analyze_with_dependencies(&uri, &change.text, params.text_document.version, true)
            .await;
        self.state.fetch_recipe_local_files(&uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(%uri, "document closed");
        self.state.host.write().await.close(&uri);
        {
            let mut active = self.state.active.write().await;
            if active.as_ref() == Some(&uri) {
                *active = None;
            }
        }
        if let Some(store) = self.state.store.read().await.clone() {
            self.state.queue_embedded(EmbeddedJob::Remove { store, uri });
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        debug!("configuration changed");
        if self.state.load_settings(Some(&params.settings)).await {
            self.state.spawn_rescan();
        }
    }

    async fn did_create_files(&self, _: CreateFilesParams) {
        self.state.host.write().await.analyzer_mut().clear_recipe_local_files();
    }

    async fn did_rename_files(&self, _: RenameFilesParams) {
        self.state.host.write().await.analyzer_mut().clear_recipe_local_files();
    }

    async fn did_delete_files(&self, _: DeleteFilesParams) {
        self.state.host.write().await.analyzer_mut().clear_recipe_local_files();
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = convert::position(params.text_document_position.position);
        debug!(%uri, line = position.line, column = position.column, "completion");

        let items = self.state.host.read().await.analysis().completions(uri, position);
        let items = items.into_iter().map(convert::completion_item).collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = convert::position(params.text_document_position_params.position);
        debug!(%uri, line = position.line, column = position.column, "definition");

        let targets = self.state.host.read().await.analysis().goto_definition(uri, position);
        let locations = targets.into_iter().map(convert::location).collect();
        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = convert::position(params.text_document_position_params.position);
        debug!(%uri, line = position.line, column = position.column, "hover");

        let result = self.state.host.read().await.analysis().hover(uri, position);
        Ok(result.map(convert::hover))
    }

    async fn prepare_rename(&self, params: TextDocumentPositionParams) -> Result<Option<PrepareRenameResponse>> {
        let position = convert::position(params.position);
        let name = self
            .state
            .host
            .read()
            .await
            .analysis()
            .prepare_rename(&params.text_document.uri, position);
        Ok(name.map(|(placeholder, span)| PrepareRenameResponse::RangeWithPlaceholder {
            range: convert::range(span),
            placeholder,
        }))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = params.text_document_position.text_document.uri;
        let position = convert::position(params.text_document_position.position);
        let edits = self
            .state
            .host
            .read()
            .await
            .analysis()
            .rename(&uri, position, &params.new_name);
        if edits.is_empty() {
            return Ok(None);
        }
        Ok(Some(convert::workspace_edit(uri, edits)))
    }

    async fn document_link(&self, params: DocumentLinkParams) -> Result<Option<Vec<DocumentLink>>> {
        let links = self
            .state
            .host
            .read()
            .await
            .analysis()
            .document_links(&params.text_document.uri);
        Ok(Some(links.into_iter().map(convert::document_link).collect()))
    }
}
