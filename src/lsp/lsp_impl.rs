mod text_document;
mod workspace;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::{
    DidChangeConfigurationParams, DidChangeTextDocumentParams, DidChangeWatchedFilesParams,
    DidChangeWorkspaceFoldersParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DocumentSymbolParams, DocumentSymbolResponse, InitializeParams, InitializeResult,
    InitializedParams, OneOf, SemanticTokensFullOptions, SemanticTokensLegend,
    SemanticTokensOptions, SemanticTokensParams, SemanticTokensResult,
    SemanticTokensServerCapabilities, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, Uri, WorkspaceFoldersServerCapabilities,
    WorkspaceServerCapabilities,
};
use tower_lsp_server::{Client, LanguageServer};
use url::Url;

use crate::analysis::DocumentPipeline;
use crate::document::DocumentStore;
use crate::engine::{LanguageEngine, RuleEngine};
use crate::highlight::{LEGEND_MODIFIERS, LEGEND_TYPES};
use crate::lsp::client::ClientNotifier;
use crate::lsp::diagnostic_sequence::DiagnosticSequencer;
use crate::lsp::settings_manager::SettingsManager;
use crate::lsp::{SettingsSource, parse_settings_layer};
use crate::workspace::Workspace;

use self::text_document::DiagnosticsPublisher;

/// Convert an `ls_types::Uri` into a `url::Url` for internal use.
pub(crate) fn uri_to_url(uri: &Uri) -> std::result::Result<Url, url::ParseError> {
    Url::parse(uri.as_str())
}

/// Convert a `url::Url` back into an `ls_types::Uri`.
pub(crate) fn url_to_uri(url: &Url) -> Option<Uri> {
    Uri::from_str(url.as_str()).ok()
}

pub struct InfiniteLs {
    client: Client,
    pipeline: DocumentPipeline,
    documents: Arc<DocumentStore>,
    sequencer: DiagnosticSequencer,
    settings_manager: SettingsManager,
}

impl std::fmt::Debug for InfiniteLs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfiniteLs")
            .field("client", &self.client)
            .field("pipeline", &self.pipeline)
            .field("settings_manager", &self.settings_manager)
            .finish_non_exhaustive()
    }
}

impl InfiniteLs {
    pub fn new(client: Client) -> Self {
        Self::with_components(client, Arc::new(Workspace::default()), Arc::new(RuleEngine))
    }

    /// Build a server around an existing workspace and engine.
    pub fn with_components(
        client: Client,
        workspace: Arc<Workspace>,
        engine: Arc<dyn LanguageEngine>,
    ) -> Self {
        Self {
            client,
            pipeline: DocumentPipeline::new(workspace, engine),
            documents: Arc::new(DocumentStore::new()),
            sequencer: DiagnosticSequencer::new(),
            settings_manager: SettingsManager::new(),
        }
    }

    fn workspace(&self) -> &Arc<Workspace> {
        self.pipeline.workspace()
    }

    fn notifier(&self) -> ClientNotifier {
        ClientNotifier::new(
            self.client.clone(),
            self.settings_manager.supports_semantic_tokens_refresh(),
        )
    }

    fn publisher(&self) -> DiagnosticsPublisher {
        DiagnosticsPublisher::new(
            self.client.clone(),
            self.pipeline.clone(),
            Arc::clone(&self.documents),
            self.sequencer.clone(),
        )
    }

    /// Workspace roots announced by the client, falling back to the
    /// deprecated `rootUri`.
    fn initial_roots(params: &InitializeParams) -> Vec<PathBuf> {
        if let Some(folders) = &params.workspace_folders
            && !folders.is_empty()
        {
            return folders
                .iter()
                .filter_map(|folder| uri_to_url(&folder.uri).ok())
                .filter_map(|url| url.to_file_path().ok())
                .collect();
        }

        #[allow(deprecated)]
        let root_uri = params.root_uri.as_ref();
        root_uri
            .and_then(|uri| uri_to_url(uri).ok())
            .and_then(|url| url.to_file_path().ok())
            .into_iter()
            .collect()
    }
}

impl LanguageServer for InfiniteLs {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.settings_manager
            .set_capabilities(params.capabilities.clone());

        let notifier = self.notifier();
        let outcome = parse_settings_layer(
            SettingsSource::InitializationOptions,
            params.initialization_options.clone().unwrap_or(Value::Null),
        );
        notifier.log_settings_events(&outcome.events).await;
        let settings = self.settings_manager.apply_initialization_layer(outcome.layer);
        self.workspace().set_ignored(&settings.ignore);

        for root in Self::initial_roots(&params) {
            let workspace = Arc::clone(self.workspace());
            let scan_root = root.clone();
            match tokio::task::spawn_blocking(move || workspace.add_root(&scan_root)).await {
                Ok(report) => notifier.log_workspace_events(&report.events).await,
                Err(err) => {
                    log::error!(
                        target: "infinite_ls::lsp",
                        "Workspace scan of {} failed: {}",
                        root.display(),
                        err
                    );
                }
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                document_symbol_provider: Some(OneOf::Left(true)),
                semantic_tokens_provider: Some(
                    SemanticTokensServerCapabilities::SemanticTokensOptions(
                        SemanticTokensOptions {
                            work_done_progress_options: Default::default(),
                            legend: SemanticTokensLegend {
                                token_types: LEGEND_TYPES.to_vec(),
                                token_modifiers: LEGEND_MODIFIERS.to_vec(),
                            },
                            range: Some(false),
                            full: Some(SemanticTokensFullOptions::Bool(true)),
                        },
                    ),
                ),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.register_config_watcher().await;
        self.notifier().log_info("infinite-ls initialized").await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.did_open_impl(params).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.did_change_impl(params).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.did_close_impl(params).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.did_change_configuration_impl(params).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        self.did_change_watched_files_impl(params).await;
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        self.did_change_workspace_folders_impl(params).await;
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        self.document_symbol_impl(params).await
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        self.semantic_tokens_full_impl(params).await
    }
}
