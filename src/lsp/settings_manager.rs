//! Server settings and client capabilities shared by the LSP handlers.
//!
//! Settings are layered: defaults, then `initializationOptions`, then the
//! latest `workspace/didChangeConfiguration` payload. Each layer is kept so
//! a new client payload is merged against the initialization options
//! rather than against the previous merge result.

use arc_swap::ArcSwap;
use std::sync::{Arc, OnceLock};
use tower_lsp_server::ls_types::ClientCapabilities;

use super::client::check_semantic_tokens_refresh_support;
use super::settings::resolve_settings;
use crate::config::{ServerSettings, SettingsOverride};

pub(crate) struct SettingsManager {
    settings: ArcSwap<ServerSettings>,
    initialization_layer: ArcSwap<Option<SettingsOverride>>,
    client_layer: ArcSwap<Option<SettingsOverride>>,
    /// Set once during initialize()
    client_capabilities: OnceLock<ClientCapabilities>,
}

impl std::fmt::Debug for SettingsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsManager")
            .field("settings", &self.settings.load_full())
            .field("client_capabilities", &"OnceLock<ClientCapabilities>")
            .finish()
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsManager {
    pub(crate) fn new() -> Self {
        Self {
            settings: ArcSwap::from_pointee(ServerSettings::default()),
            initialization_layer: ArcSwap::from_pointee(None),
            client_layer: ArcSwap::from_pointee(None),
            client_capabilities: OnceLock::new(),
        }
    }

    /// Store client capabilities from initialize(); later calls are ignored.
    pub(crate) fn set_capabilities(&self, caps: ClientCapabilities) {
        let _ = self.client_capabilities.set(caps);
    }

    pub(crate) fn client_capabilities(&self) -> Option<&ClientCapabilities> {
        self.client_capabilities.get()
    }

    pub(crate) fn load_settings(&self) -> Arc<ServerSettings> {
        self.settings.load_full()
    }

    /// Replace the initialization-options layer and return the merged settings.
    pub(crate) fn apply_initialization_layer(
        &self,
        layer: Option<SettingsOverride>,
    ) -> Arc<ServerSettings> {
        self.initialization_layer.store(Arc::new(layer));
        self.remerge()
    }

    /// Replace the client-configuration layer and return the merged settings.
    pub(crate) fn apply_client_layer(&self, layer: Option<SettingsOverride>) -> Arc<ServerSettings> {
        self.client_layer.store(Arc::new(layer));
        self.remerge()
    }

    fn remerge(&self) -> Arc<ServerSettings> {
        let initialization = self.initialization_layer.load_full();
        let client = self.client_layer.load_full();
        let merged = Arc::new(resolve_settings(
            (*initialization).as_ref(),
            (*client).as_ref(),
        ));
        self.settings.store(Arc::clone(&merged));
        merged
    }

    /// Returns true only if client declared workspace.semanticTokens.refreshSupport.
    pub(crate) fn supports_semantic_tokens_refresh(&self) -> bool {
        self.client_capabilities
            .get()
            .is_some_and(check_semantic_tokens_refresh_support)
    }

    /// Returns true if the client can register `workspace/didChangeWatchedFiles`
    /// dynamically.
    pub(crate) fn supports_watched_files_registration(&self) -> bool {
        self.client_capabilities
            .get()
            .and_then(|caps| caps.workspace.as_ref())
            .and_then(|workspace| workspace.did_change_watched_files.as_ref())
            .and_then(|watched| watched.dynamic_registration)
            .unwrap_or(false)
    }
}
