//! Text document related LSP methods.

mod document_symbol;
mod publish_diagnostic;
mod semantic_tokens;

pub(super) use publish_diagnostic::DiagnosticsPublisher;

use tower_lsp_server::ls_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
};

use super::{InfiniteLs, uri_to_url};
use crate::lsp::text_sync::apply_content_changes;

impl InfiniteLs {
    pub(super) async fn did_open_impl(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        let Ok(uri) = uri_to_url(&document.uri) else {
            log::warn!(target: "infinite_ls::lsp", "Invalid URI in didOpen: {}", document.uri.as_str());
            return;
        };

        self.documents
            .insert(uri.clone(), document.text, document.version);
        self.publisher().validate(uri).await;
    }

    pub(super) async fn did_change_impl(&self, params: DidChangeTextDocumentParams) {
        let Ok(uri) = uri_to_url(&params.text_document.uri) else {
            log::warn!(
                target: "infinite_ls::lsp",
                "Invalid URI in didChange: {}",
                params.text_document.uri.as_str()
            );
            return;
        };

        let version = params.text_document.version;
        let content_changes = params.content_changes;
        let updated = self.documents.update_with(&uri, version, |old_text| {
            apply_content_changes(old_text, content_changes)
        });
        if updated.is_none() {
            log::warn!(target: "infinite_ls::lsp", "didChange for unopened document {}", uri);
            return;
        }

        self.publisher().validate(uri).await;
    }

    pub(super) async fn did_close_impl(&self, params: DidCloseTextDocumentParams) {
        let Ok(uri) = uri_to_url(&params.text_document.uri) else {
            return;
        };

        self.documents.remove(&uri);
        self.sequencer.forget(&uri);
        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;
    }
}
