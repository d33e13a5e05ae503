use std::sync::Arc;

use super::{ParseError, SyntaxChild, SyntaxNode, Token};
use crate::highlight::HighlightCategory;
use crate::plugin::{ParseRule, ParserPlugin};

/// Kind of the root node wrapping all matched productions
pub(super) const ROOT_KIND: &str = "document";

/// Why a rule stopped matching
struct Mismatch {
    /// Token index where the rule failed
    at: usize,
    expected: String,
}

/// Match `tokens` as a sequence of productions from `modules`.
///
/// At each position the rules are tried in plugin order and the first full
/// match wins. When none match, an error is recorded at the furthest point
/// any rule reached, the offending token is skipped, and parsing resumes.
pub(super) fn parse(
    tokens: &[Token],
    modules: &[Arc<ParserPlugin>],
) -> Result<SyntaxNode, Vec<ParseError>> {
    let rules: Vec<&ParseRule> = modules.iter().flat_map(|m| m.rules()).collect();
    let tried: Vec<String> = rules.iter().map(|rule| rule.name.clone()).collect();

    let mut productions = Vec::new();
    let mut errors = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        let mut mismatches = Vec::new();
        let mut matched = None;
        for rule in &rules {
            match match_rule(rule, tokens, pos) {
                Ok(found) => {
                    matched = Some(found);
                    break;
                }
                Err(mismatch) => mismatches.push(mismatch),
            }
        }

        if let Some((node, next)) = matched {
            productions.push(node);
            pos = next;
            continue;
        }

        let at = mismatches.iter().map(|m| m.at).max().unwrap_or(pos);
        let mut expected: Vec<&str> = Vec::new();
        for mismatch in mismatches.iter().filter(|m| m.at == at) {
            if !expected.contains(&mismatch.expected.as_str()) {
                expected.push(&mismatch.expected);
            }
        }
        let expected = if expected.is_empty() {
            "a production".to_string()
        } else {
            expected.join(" or ")
        };

        let (start_pos, end_pos, actual) = match tokens.get(at) {
            Some(token) => (token.start_pos, token.end_pos, token.token_type.clone()),
            None => {
                let end = tokens.last().map_or(0, |t| t.end_pos);
                (end, end, "end of input".to_string())
            }
        };
        errors.push(ParseError {
            start_pos,
            end_pos,
            expected,
            actual,
            tried: tried.clone(),
        });
        pos = at + 1;
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(SyntaxNode {
        kind: ROOT_KIND.to_string(),
        start_pos: tokens.first().map_or(0, |t| t.start_pos),
        end_pos: tokens.last().map_or(0, |t| t.end_pos),
        children: vec![SyntaxChild::Group(productions)],
        semantic_highlight: None,
    })
}

fn match_rule(
    rule: &ParseRule,
    tokens: &[Token],
    start: usize,
) -> Result<(SyntaxNode, usize), Mismatch> {
    let mut pos = start;
    let mut children = Vec::with_capacity(rule.sequence.len());

    for element in &rule.sequence {
        let matches = |token: &Token| token.token_type == element.token;
        match tokens.get(pos) {
            Some(token) if matches(token) => {}
            _ => {
                return Err(Mismatch {
                    at: pos,
                    expected: element.token.clone(),
                });
            }
        }

        if element.repeat {
            let mut group = Vec::new();
            while let Some(token) = tokens.get(pos)
                && matches(token)
            {
                group.push(leaf(token, element.highlight));
                pos += 1;
            }
            children.push(SyntaxChild::Group(group));
        } else {
            children.push(SyntaxChild::Node(leaf(&tokens[pos], element.highlight)));
            pos += 1;
        }
    }

    let node = SyntaxNode {
        kind: rule.name.clone(),
        start_pos: tokens[start].start_pos,
        end_pos: tokens[pos - 1].end_pos,
        children,
        semantic_highlight: rule.highlight,
    };
    Ok((node, pos))
}

fn leaf(token: &Token, highlight: Option<HighlightCategory>) -> SyntaxNode {
    SyntaxNode {
        kind: token.token_type.clone(),
        start_pos: token.start_pos,
        end_pos: token.end_pos,
        children: Vec::new(),
        semantic_highlight: highlight,
    }
}
