use std::sync::Arc;

use super::{Token, TokenError};
use crate::plugin::{TokenRule, TokenizerPlugin};

/// Split `input` into tokens using the rules of `modules` in order.
///
/// The first rule producing a non-empty match at the scan position wins.
/// Unrecognised characters are collected into maximal error spans and
/// scanning resumes after them, so every bad span is reported at once.
pub(super) fn tokenize(
    input: &str,
    modules: &[Arc<TokenizerPlugin>],
) -> Result<Vec<Token>, Vec<TokenError>> {
    let mut tokens = Vec::new();
    let mut errors: Vec<TokenError> = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        match match_at(input, pos, modules) {
            Some((rule, len)) => {
                if !rule.skip {
                    tokens.push(Token {
                        start_pos: pos,
                        end_pos: pos + len,
                        token_type: rule.token_type.clone(),
                        highlight: rule.highlight,
                    });
                }
                pos += len;
            }
            None => {
                let char_len = input[pos..].chars().next().map_or(1, char::len_utf8);
                if let Some(last) = errors.last_mut()
                    && last.end_pos == pos
                {
                    last.end_pos += char_len;
                } else {
                    errors.push(TokenError {
                        start_pos: pos,
                        end_pos: pos + char_len,
                    });
                }
                pos += char_len;
            }
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

fn match_at<'a>(
    input: &str,
    pos: usize,
    modules: &'a [Arc<TokenizerPlugin>],
) -> Option<(&'a TokenRule, usize)> {
    let rest = &input[pos..];
    modules
        .iter()
        .flat_map(|module| module.rules())
        .find_map(|rule| {
            rule.regex
                .find(rest)
                .filter(|m| m.end() > 0)
                .map(|m| (rule, m.end()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::HighlightCategory;
    use crate::plugin::TokenizerRuleTable;

    fn plugin(json: &str) -> Arc<TokenizerPlugin> {
        let table: TokenizerRuleTable = serde_json::from_str(json).unwrap();
        Arc::new(TokenizerPlugin::compile(table).unwrap())
    }

    fn words() -> Arc<TokenizerPlugin> {
        plugin(
            r#"{ "rules": [
                { "type": "word", "pattern": "[a-z]+", "highlight": "variable" },
                { "type": "ws", "pattern": "\\s+", "skip": true }
            ] }"#,
        )
    }

    #[test]
    fn test_tokenize_skips_whitespace() {
        let tokens = tokenize("abc de", &[words()]).unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!((tokens[0].start_pos, tokens[0].end_pos), (0, 3));
        assert_eq!((tokens[1].start_pos, tokens[1].end_pos), (4, 6));
        assert_eq!(tokens[0].highlight, Some(HighlightCategory::Variable));
    }

    #[test]
    fn test_earlier_modules_take_precedence() {
        let keywords = plugin(r#"{ "rules": [ { "type": "kw", "pattern": "let" } ] }"#);

        let tokens = tokenize("let", &[keywords.clone(), words()]).unwrap();
        assert_eq!(tokens[0].token_type, "kw");

        let tokens = tokenize("let", &[words(), keywords]).unwrap();
        assert_eq!(tokens[0].token_type, "word");
    }

    #[test]
    fn test_unknown_spans_are_merged() {
        let errors = tokenize("ab 12 cd 3", &[words()]).unwrap_err();

        assert_eq!(
            errors,
            vec![
                TokenError {
                    start_pos: 3,
                    end_pos: 5
                },
                TokenError {
                    start_pos: 9,
                    end_pos: 10
                },
            ]
        );
    }

    #[test]
    fn test_multibyte_unknown_character() {
        let errors = tokenize("a\u{3042}", &[words()]).unwrap_err();
        assert_eq!(
            errors,
            vec![TokenError {
                start_pos: 1,
                end_pos: 4
            }]
        );
    }

    #[test]
    fn test_no_modules_rejects_any_input() {
        assert!(tokenize("", &[]).unwrap().is_empty());
        assert!(tokenize("x", &[]).is_err());
    }
}
