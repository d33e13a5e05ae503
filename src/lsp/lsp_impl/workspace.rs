//! Workspace related LSP methods: configuration file watching, settings
//! changes and workspace folder changes.

use std::sync::Arc;

use tower_lsp_server::ls_types::{
    DidChangeConfigurationParams, DidChangeWatchedFilesParams,
    DidChangeWatchedFilesRegistrationOptions, DidChangeWorkspaceFoldersParams, FileChangeType,
    FileSystemWatcher, GlobPattern, Registration,
};

use super::{InfiniteLs, uri_to_url};
use crate::config::CONFIG_FILE_NAME;
use crate::lsp::{SettingsSource, parse_settings_layer};
use crate::workspace::{ChangeKind, ConfigChange, Workspace, WorkspaceReport};

const CONFIG_WATCHER_ID: &str = "infinite-ls/config-watcher";

fn change_kind(kind: FileChangeType) -> Option<ChangeKind> {
    match kind {
        FileChangeType::CREATED => Some(ChangeKind::Created),
        FileChangeType::CHANGED => Some(ChangeKind::Changed),
        FileChangeType::DELETED => Some(ChangeKind::Deleted),
        _ => None,
    }
}

impl InfiniteLs {
    /// Ask the client to watch every configuration file in the workspace.
    pub(super) async fn register_config_watcher(&self) {
        if !self.settings_manager.supports_watched_files_registration() {
            log::debug!(
                target: "infinite_ls::watcher",
                "Client cannot register file watchers dynamically"
            );
            return;
        }

        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(format!("**/{CONFIG_FILE_NAME}")),
                kind: None,
            }],
        };
        let register_options = match serde_json::to_value(options) {
            Ok(value) => value,
            Err(err) => {
                log::warn!(target: "infinite_ls::watcher", "Cannot encode watcher options: {}", err);
                return;
            }
        };

        let registration = Registration {
            id: CONFIG_WATCHER_ID.to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: Some(register_options),
        };
        if let Err(err) = self.client.register_capability(vec![registration]).await {
            self.notifier()
                .log_warning(format!("Failed to register configuration watcher: {err}"))
                .await;
        }
    }

    /// Each configuration change is applied by its own task.
    pub(super) async fn did_change_watched_files_impl(&self, params: DidChangeWatchedFilesParams) {
        for event in params.changes {
            let Some(kind) = change_kind(event.typ) else {
                continue;
            };
            let Ok(url) = uri_to_url(&event.uri) else {
                continue;
            };
            let change = ConfigChange::classify(&url, kind);
            if change == ConfigChange::Ignored {
                continue;
            }

            let workspace = Arc::clone(self.workspace());
            let notifier = self.notifier();
            let publisher = self.publisher();
            tokio::spawn(async move {
                let report =
                    match tokio::task::spawn_blocking(move || change.apply(&workspace)).await {
                        Ok(report) => report,
                        Err(err) => {
                            log::error!(target: "infinite_ls::watcher", "Reload task failed: {}", err);
                            return;
                        }
                    };
                notifier.log_workspace_events(&report.events).await;

                let changed = report.changed_directories();
                if !changed.is_empty() {
                    publisher.revalidate_under(&changed).await;
                    notifier.refresh_semantic_tokens();
                }
            });
        }
    }

    pub(super) async fn did_change_configuration_impl(&self, params: DidChangeConfigurationParams) {
        let notifier = self.notifier();
        let outcome = parse_settings_layer(SettingsSource::ClientConfiguration, params.settings);
        notifier.log_settings_events(&outcome.events).await;

        let previous = self.settings_manager.load_settings();
        let settings = self.settings_manager.apply_client_layer(outcome.layer);

        if previous.ignore != settings.ignore {
            self.workspace().set_ignored(&settings.ignore);
            let report = self
                .run_on_workspace(|workspace| workspace.rescan())
                .await;
            notifier.log_workspace_events(&report.events).await;
            self.publisher().revalidate_all().await;
        }
        if previous.semantic_tokens != settings.semantic_tokens || previous.ignore != settings.ignore
        {
            notifier.refresh_semantic_tokens();
        }
    }

    pub(super) async fn did_change_workspace_folders_impl(
        &self,
        params: DidChangeWorkspaceFoldersParams,
    ) {
        let removed: Vec<_> = params
            .event
            .removed
            .iter()
            .filter_map(|folder| uri_to_url(&folder.uri).ok()?.to_file_path().ok())
            .collect();
        let added: Vec<_> = params
            .event
            .added
            .iter()
            .filter_map(|folder| uri_to_url(&folder.uri).ok()?.to_file_path().ok())
            .collect();

        let report = self
            .run_on_workspace(move |workspace| {
                let mut report = WorkspaceReport::default();
                for root in &removed {
                    report.merge(workspace.remove_root(root));
                }
                for root in &added {
                    report.merge(workspace.add_root(root));
                }
                report
            })
            .await;

        self.notifier().log_workspace_events(&report.events).await;
        let changed = report.changed_directories();
        if !changed.is_empty() {
            self.publisher().revalidate_under(&changed).await;
            self.notifier().refresh_semantic_tokens();
        }
    }

    /// Run a filesystem-bound workspace operation on a blocking thread.
    async fn run_on_workspace<F>(&self, operation: F) -> WorkspaceReport
    where
        F: FnOnce(&Workspace) -> WorkspaceReport + Send + 'static,
    {
        let workspace = Arc::clone(self.workspace());
        match tokio::task::spawn_blocking(move || operation(&workspace)).await {
            Ok(report) => report,
            Err(err) => {
                log::error!(target: "infinite_ls::workspace", "Workspace task failed: {}", err);
                WorkspaceReport::default()
            }
        }
    }
}
