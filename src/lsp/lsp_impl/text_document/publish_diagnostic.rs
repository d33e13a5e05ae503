//! Push diagnostics after document and configuration changes.
//!
//! Every run takes a sequence number from [`DiagnosticSequencer`] before
//! doing any work and publishes only if no newer run for the same document
//! has started meanwhile.

use std::path::Path;
use std::sync::Arc;

use tower_lsp_server::Client;
use tower_lsp_server::ls_types::Diagnostic;
use url::Url;

use super::super::url_to_uri;
use crate::analysis::DocumentPipeline;
use crate::document::DocumentStore;
use crate::lsp::diagnostic_sequence::DiagnosticSequencer;

/// Everything needed to validate documents, detached from the server so it
/// can be moved into spawned tasks.
#[derive(Clone)]
pub(crate) struct DiagnosticsPublisher {
    client: Client,
    pipeline: DocumentPipeline,
    documents: Arc<DocumentStore>,
    sequencer: DiagnosticSequencer,
}

impl DiagnosticsPublisher {
    pub(crate) fn new(
        client: Client,
        pipeline: DocumentPipeline,
        documents: Arc<DocumentStore>,
        sequencer: DiagnosticSequencer,
    ) -> Self {
        Self {
            client,
            pipeline,
            documents,
            sequencer,
        }
    }

    /// Run the pipeline on the current text of `uri` and publish the result.
    pub(crate) async fn validate(&self, uri: Url) {
        let sequence = self.sequencer.begin(&uri);
        let Some(document) = self.documents.get(&uri) else {
            return;
        };

        let diagnostics = match uri.to_file_path() {
            Ok(path) => {
                let pipeline = self.pipeline.clone();
                let text = document.text().to_string();
                match tokio::task::spawn_blocking(move || pipeline.diagnostics(&path, &text)).await
                {
                    Ok(diagnostics) => diagnostics,
                    Err(err) => {
                        log::error!(
                            target: "infinite_ls::diagnostics",
                            "Validation of {} failed: {}",
                            uri,
                            err
                        );
                        return;
                    }
                }
            }
            Err(()) => Vec::new(),
        };

        if !self.sequencer.is_latest(&uri, sequence) {
            log::debug!(
                target: "infinite_ls::diagnostics",
                "Dropping superseded diagnostics for {} (run {})",
                uri,
                sequence
            );
            return;
        }

        self.publish(&uri, diagnostics, Some(document.version()))
            .await;
    }

    /// Validate every open document located under one of `directories`.
    pub(crate) async fn revalidate_under(&self, directories: &[&Path]) {
        let uris = self.documents.uris_matching(|uri| {
            uri.to_file_path()
                .is_ok_and(|path| directories.iter().any(|dir| path.starts_with(dir)))
        });
        for uri in uris {
            self.validate(uri).await;
        }
    }

    /// Validate every open document.
    pub(crate) async fn revalidate_all(&self) {
        for uri in self.documents.uris_matching(|_| true) {
            self.validate(uri).await;
        }
    }

    async fn publish(&self, uri: &Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
        let Some(lsp_uri) = url_to_uri(uri) else {
            log::warn!(target: "infinite_ls::diagnostics", "Cannot convert {} to a URI", uri);
            return;
        };
        self.client
            .publish_diagnostics(lsp_uri, diagnostics, version)
            .await;
    }
}
