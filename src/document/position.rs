use tower_lsp_server::ls_types::{Position, Range};

/// Maps byte offsets in a document to LSP positions (UTF-16 columns) and back.
pub struct PositionMapper<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> PositionMapper<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            line_starts: compute_line_starts(text),
        }
    }

    /// Byte offset of `position`; columns past the line end clamp to it.
    pub fn position_to_byte(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let (start, end) = self.line_bounds(line)?;
        let line_text = &self.text[start..end];
        let column = utf16_to_byte_in_line(line_text, position.character as usize)
            .unwrap_or(line_text.len());
        Some(start + column)
    }

    /// Position of byte `offset`; an offset inside a multi-byte character
    /// maps to the character's start.
    pub fn byte_to_position(&self, offset: usize) -> Option<Position> {
        if offset > self.text.len() {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let (start, end) = self.line_bounds(line)?;
        let mut column = (offset - start).min(end - start);
        let line_text = &self.text[start..end];
        while !line_text.is_char_boundary(column) {
            column -= 1;
        }

        Some(Position {
            line: line as u32,
            character: utf16_len(&line_text[..column]) as u32,
        })
    }

    pub fn byte_range_to_range(&self, start: usize, end: usize) -> Option<Range> {
        Some(Range {
            start: self.byte_to_position(start)?,
            end: self.byte_to_position(end)?,
        })
    }

    /// Length in UTF-16 code units of the text in `[start, end)`
    pub fn utf16_span_len(&self, start: usize, end: usize) -> Option<u32> {
        self.text
            .get(start..end)
            .map(|span| utf16_len(span) as u32)
    }

    /// Byte bounds of `line`, excluding its terminator
    fn line_bounds(&self, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line)?;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        let end = if self.text[start..end].ends_with('\r') {
            end - 1
        } else {
            end
        };
        Some((start, end))
    }
}

/// Byte offsets at which each line begins
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut line_starts = vec![0];
    line_starts.extend(
        text.bytes()
            .enumerate()
            .filter(|(_, byte)| *byte == b'\n')
            .map(|(offset, _)| offset + 1),
    );
    line_starts
}

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte offset within `line_text` of UTF-16 column `utf16_pos`, or `None`
/// when the column is past the end of the line.
fn utf16_to_byte_in_line(line_text: &str, utf16_pos: usize) -> Option<usize> {
    let mut utf16_offset = 0;
    for (byte_offset, ch) in line_text.char_indices() {
        if utf16_offset >= utf16_pos {
            return Some(byte_offset);
        }
        utf16_offset += ch.len_utf16();
    }
    (utf16_offset >= utf16_pos).then_some(line_text.len())
}
