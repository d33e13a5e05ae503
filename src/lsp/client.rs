//! Client-facing notifications.
//!
//! `ClientNotifier` wraps `tower_lsp_server::Client` and owns everything the
//! server tells the editor on its own initiative: log messages and semantic
//! token refresh requests. It is cheap to clone so spawned tasks can carry
//! one.

use tower_lsp_server::Client;
use tower_lsp_server::ls_types::{ClientCapabilities, MessageType};

use crate::lsp::{SettingsEvent, SettingsEventKind};
use crate::workspace::{WorkspaceEvent, WorkspaceLogLevel};

/// Whether `caps` declare `workspace.semanticTokens.refreshSupport`.
///
/// Missing capabilities count as unsupported.
pub(crate) fn check_semantic_tokens_refresh_support(caps: &ClientCapabilities) -> bool {
    caps.workspace
        .as_ref()
        .and_then(|w| w.semantic_tokens.as_ref())
        .and_then(|st| st.refresh_support)
        .unwrap_or(false)
}

#[derive(Clone)]
pub(crate) struct ClientNotifier {
    client: Client,
    /// Captured from the client capabilities when the notifier is built
    refresh_supported: bool,
}

impl std::fmt::Debug for ClientNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientNotifier")
            .field("client", &self.client)
            .field("refresh_supported", &self.refresh_supported)
            .finish()
    }
}

impl ClientNotifier {
    pub(crate) fn new(client: Client, refresh_supported: bool) -> Self {
        Self {
            client,
            refresh_supported,
        }
    }

    pub(crate) async fn log(&self, level: MessageType, message: impl Into<String>) {
        self.client.log_message(level, message.into()).await;
    }

    pub(crate) async fn log_info(&self, message: impl Into<String>) {
        self.log(MessageType::INFO, message).await;
    }

    pub(crate) async fn log_warning(&self, message: impl Into<String>) {
        self.log(MessageType::WARNING, message).await;
    }

    /// Ask the client to re-request semantic tokens, when it supports that.
    ///
    /// The request is fire-and-forget; the response carries no data.
    pub(crate) fn refresh_semantic_tokens(&self) {
        if !self.refresh_supported {
            log::debug!(
                target: "infinite_ls::client",
                "Skipping semantic_tokens_refresh - client does not support it"
            );
            return;
        }
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(err) = client.semantic_tokens_refresh().await {
                log::debug!(target: "infinite_ls::client", "semantic_tokens_refresh failed: {}", err);
            }
        });
    }

    /// Forward the log events of a workspace operation to the client.
    ///
    /// `ConfigurationChanged` events are not logged; callers act on them.
    pub(crate) async fn log_workspace_events(&self, events: &[WorkspaceEvent]) {
        for event in events {
            if let WorkspaceEvent::Log { level, message } = event {
                let message_type = match level {
                    WorkspaceLogLevel::Error => MessageType::ERROR,
                    WorkspaceLogLevel::Warning => MessageType::WARNING,
                    WorkspaceLogLevel::Info => MessageType::INFO,
                };
                self.client.log_message(message_type, message.clone()).await;
            }
        }
    }

    pub(crate) async fn log_settings_events(&self, events: &[SettingsEvent]) {
        for event in events {
            let message_type = match event.kind {
                SettingsEventKind::Info => MessageType::INFO,
                SettingsEventKind::Warning => MessageType::WARNING,
            };
            self.client
                .log_message(message_type, event.message.clone())
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tower_lsp_server::ls_types::{
        SemanticTokensWorkspaceClientCapabilities, WorkspaceClientCapabilities,
    };

    #[rstest]
    #[case::refresh_support_true(true, true, Some(true), true)]
    #[case::refresh_support_false(true, true, Some(false), false)]
    #[case::refresh_support_none(true, true, None, false)]
    #[case::semantic_tokens_none(true, false, None, false)]
    #[case::workspace_none(false, false, None, false)]
    fn test_check_refresh_support(
        #[case] workspace: bool,
        #[case] semantic_tokens: bool,
        #[case] refresh_support: Option<bool>,
        #[case] expected: bool,
    ) {
        let caps = ClientCapabilities {
            workspace: workspace.then(|| WorkspaceClientCapabilities {
                semantic_tokens: semantic_tokens
                    .then_some(SemanticTokensWorkspaceClientCapabilities { refresh_support }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(check_semantic_tokens_refresh_support(&caps), expected);
    }
}
