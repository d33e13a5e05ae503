//! Tokenize/parse seam.
//!
//! The pipeline only depends on [`LanguageEngine`]. [`RuleEngine`] is the
//! bundled implementation interpreting plugin rule tables: earlier plugins
//! (and earlier rules within a plugin) are tried first.

mod parser;
mod tokenizer;

use std::sync::Arc;

use crate::highlight::HighlightCategory;
use crate::plugin::{ParserPlugin, TokenizerPlugin};

/// A lexed token; offsets are byte offsets into the document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start_pos: usize,
    pub end_pos: usize,
    pub token_type: String,
    pub highlight: Option<HighlightCategory>,
}

/// An input span no tokenizer rule recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenError {
    pub start_pos: usize,
    pub end_pos: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxChild {
    Node(SyntaxNode),
    /// Array-valued child group, e.g. a repeated element
    Group(Vec<SyntaxNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: String,
    pub start_pos: usize,
    pub end_pos: usize,
    pub children: Vec<SyntaxChild>,
    pub semantic_highlight: Option<HighlightCategory>,
}

impl SyntaxNode {
    /// Visit this node and all descendants depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SyntaxNode)) {
        visit(self);
        for child in &self.children {
            match child {
                SyntaxChild::Node(node) => node.walk(visit),
                SyntaxChild::Group(nodes) => {
                    for node in nodes {
                        node.walk(visit);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub start_pos: usize,
    pub end_pos: usize,
    pub expected: String,
    pub actual: String,
    /// Names of the productions attempted at this position, in order
    pub tried: Vec<String>,
}

pub trait LanguageEngine: Send + Sync {
    fn tokenize(
        &self,
        input: &str,
        modules: &[Arc<TokenizerPlugin>],
    ) -> Result<Vec<Token>, Vec<TokenError>>;

    fn parse(
        &self,
        tokens: &[Token],
        modules: &[Arc<ParserPlugin>],
    ) -> Result<SyntaxNode, Vec<ParseError>>;
}

/// Generic engine driven entirely by rule tables
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleEngine;

impl LanguageEngine for RuleEngine {
    fn tokenize(
        &self,
        input: &str,
        modules: &[Arc<TokenizerPlugin>],
    ) -> Result<Vec<Token>, Vec<TokenError>> {
        tokenizer::tokenize(input, modules)
    }

    fn parse(
        &self,
        tokens: &[Token],
        modules: &[Arc<ParserPlugin>],
    ) -> Result<SyntaxNode, Vec<ParseError>> {
        parser::parse(tokens, modules)
    }
}
