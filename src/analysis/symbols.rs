use tower_lsp_server::ls_types::{Location, SymbolInformation, Uri};

use crate::document::PositionMapper;
use crate::engine::Token;

/// Flat symbol list: every highlighted token becomes one symbol named by
/// its token type.
#[allow(deprecated)]
pub fn token_symbols(uri: &Uri, text: &str, tokens: &[Token]) -> Vec<SymbolInformation> {
    let mapper = PositionMapper::new(text);
    tokens
        .iter()
        .filter_map(|token| {
            let category = token.highlight?;
            let range = mapper.byte_range_to_range(token.start_pos, token.end_pos)?;
            Some(SymbolInformation {
                name: token.token_type.clone(),
                kind: category.symbol_kind(),
                tags: None,
                deprecated: None,
                location: Location::new(uri.clone(), range),
                container_name: None,
            })
        })
        .collect()
}
