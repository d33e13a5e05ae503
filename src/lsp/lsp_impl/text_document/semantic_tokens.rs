use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::{SemanticTokensParams, SemanticTokensResult};

use super::super::{InfiniteLs, uri_to_url};

impl InfiniteLs {
    pub(crate) async fn semantic_tokens_full_impl(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        if !self.settings_manager.load_settings().semantic_tokens {
            return Ok(None);
        }

        let lsp_uri = params.text_document.uri;
        let Ok(uri) = uri_to_url(&lsp_uri) else {
            log::warn!(target: "infinite_ls::semantic_tokens", "Invalid URI: {}", lsp_uri.as_str());
            return Ok(None);
        };
        let (Some(text), Ok(path)) = (self.documents.get_document_text(&uri), uri.to_file_path())
        else {
            return Ok(None);
        };

        let pipeline = self.pipeline.clone();
        match tokio::task::spawn_blocking(move || pipeline.semantic_tokens(&path, &text)).await {
            Ok(tokens) => Ok(Some(SemanticTokensResult::Tokens(tokens))),
            Err(err) => {
                log::error!(target: "infinite_ls::semantic_tokens", "Token task failed: {}", err);
                Ok(None)
            }
        }
    }
}
