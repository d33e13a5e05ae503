//! Applying `didChange` content changes to document text.

use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

use crate::document::PositionMapper;

/// Apply `content_changes` to `old_text` in order.
///
/// A change with a range replaces that range (UTF-16 positions); a change
/// without one replaces the whole text.
pub(crate) fn apply_content_changes(
    old_text: &str,
    content_changes: Vec<TextDocumentContentChangeEvent>,
) -> String {
    let mut text = old_text.to_string();

    for change in content_changes {
        match change.range {
            Some(range) => {
                let mapper = PositionMapper::new(&text);
                let start = mapper.position_to_byte(range.start).unwrap_or(text.len());
                let end = mapper
                    .position_to_byte(range.end)
                    .unwrap_or(text.len())
                    .max(start);
                text.replace_range(start..end, &change.text);
            }
            None => text = change.text,
        }
    }

    text
}
