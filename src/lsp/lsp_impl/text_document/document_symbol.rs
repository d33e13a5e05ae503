use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::{DocumentSymbolParams, DocumentSymbolResponse};

use super::super::{InfiniteLs, uri_to_url};

impl InfiniteLs {
    pub(crate) async fn document_symbol_impl(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let lsp_uri = params.text_document.uri;
        let Ok(uri) = uri_to_url(&lsp_uri) else {
            log::warn!(target: "infinite_ls::document_symbol", "Invalid URI: {}", lsp_uri.as_str());
            return Ok(None);
        };
        let (Some(text), Ok(path)) = (self.documents.get_document_text(&uri), uri.to_file_path())
        else {
            return Ok(None);
        };

        let pipeline = self.pipeline.clone();
        let symbols = tokio::task::spawn_blocking(move || {
            pipeline.document_symbols(&lsp_uri, &path, &text)
        })
        .await;

        match symbols {
            Ok(symbols) => Ok(Some(DocumentSymbolResponse::Flat(symbols))),
            Err(err) => {
                log::error!(target: "infinite_ls::document_symbol", "Symbol task failed: {}", err);
                Ok(None)
            }
        }
    }
}
