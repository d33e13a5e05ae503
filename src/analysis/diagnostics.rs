use tower_lsp_server::ls_types::{Diagnostic, DiagnosticSeverity, Range};

use crate::document::PositionMapper;
use crate::engine::{ParseError, TokenError};

pub(crate) const DIAGNOSTIC_SOURCE: &str = "infinite-ls";

/// One error diagnostic per unrecognised span, quoting the offending text.
pub fn token_error_diagnostics(text: &str, errors: &[TokenError]) -> Vec<Diagnostic> {
    let mapper = PositionMapper::new(text);
    errors
        .iter()
        .map(|error| {
            let snippet = text.get(error.start_pos..error.end_pos).unwrap_or_default();
            error_diagnostic(
                span_range(&mapper, error.start_pos, error.end_pos),
                format!("Unknown token: {snippet}"),
            )
        })
        .collect()
}

/// One error diagnostic per parse failure, listing the alternatives tried.
pub fn parse_error_diagnostics(text: &str, errors: &[ParseError]) -> Vec<Diagnostic> {
    let mapper = PositionMapper::new(text);
    errors
        .iter()
        .map(|error| {
            error_diagnostic(
                span_range(&mapper, error.start_pos, error.end_pos),
                parse_error_message(error),
            )
        })
        .collect()
}

fn parse_error_message(error: &ParseError) -> String {
    let mut message = format!("Expected {}, found {}", error.expected, error.actual);
    if !error.tried.is_empty() {
        message.push_str("\n\tTried:");
        for alternative in &error.tried {
            message.push_str("\n\t\t");
            message.push_str(alternative);
        }
    }
    message
}

fn error_diagnostic(range: Range, message: String) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message,
        ..Default::default()
    }
}

/// Range of `[start, end)`, clamped to the end of the text
fn span_range(mapper: &PositionMapper<'_>, start: usize, end: usize) -> Range {
    mapper
        .byte_range_to_range(start, end)
        .or_else(|| {
            let start = mapper.byte_to_position(start)?;
            Some(Range { start, end: start })
        })
        .unwrap_or_default()
}
