//! Semantic token collection and delta encoding.

use indexmap::IndexMap;
use tower_lsp_server::ls_types::{SemanticToken, SemanticTokens};

use crate::document::PositionMapper;
use crate::engine::{SyntaxNode, Token};
use crate::highlight::HighlightCategory;

/// Highlighted spans keyed by `(start, end)` byte offsets.
///
/// Insertion order is kept; a later insert for the same span replaces the
/// category but not the position of the entry.
#[derive(Debug, Default)]
pub struct HighlightMap {
    spans: IndexMap<(usize, usize), HighlightCategory>,
}

impl HighlightMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, start: usize, end: usize, category: HighlightCategory) {
        self.spans.insert((start, end), category);
    }

    /// Add every highlighted token.
    pub fn extend_tokens(&mut self, tokens: &[Token]) {
        for token in tokens {
            if let Some(category) = token.highlight {
                self.insert(token.start_pos, token.end_pos, category);
            }
        }
    }

    /// Add every highlighted node of `root`, parents before children.
    pub fn extend_tree(&mut self, root: &SyntaxNode) {
        root.walk(&mut |node| {
            if let Some(category) = node.semantic_highlight {
                self.insert(node.start_pos, node.end_pos, category);
            }
        });
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Delta-encode the collected spans against `text`.
    pub fn encode(&self, text: &str) -> SemanticTokens {
        let mapper = PositionMapper::new(text);

        let mut resolved: Vec<(u32, u32, u32, u32)> = self
            .spans
            .iter()
            .filter_map(|(&(start, end), category)| {
                let position = mapper.byte_to_position(start)?;
                let length = mapper.utf16_span_len(start, end)?;
                Some((
                    position.line,
                    position.character,
                    length,
                    category.token_type_index(),
                ))
            })
            .collect();
        // Stable: spans at the same position keep insertion order.
        resolved.sort_by_key(|&(line, character, _, _)| (line, character));

        let mut data = Vec::with_capacity(resolved.len());
        let mut last_line = 0;
        let mut last_start = 0;
        for (line, character, length, token_type) in resolved {
            let delta_line = line - last_line;
            let delta_start = if delta_line == 0 {
                character - last_start
            } else {
                character
            };

            data.push(SemanticToken {
                delta_line,
                delta_start,
                length,
                token_type,
                token_modifiers_bitset: 0,
            });

            last_line = line;
            last_start = character;
        }

        SemanticTokens {
            result_id: None,
            data,
        }
    }
}
