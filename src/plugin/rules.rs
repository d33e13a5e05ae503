//! Plugin rule tables.
//!
//! A tokenizer plugin is an ordered list of regex rules; a parser plugin is
//! an ordered list of named token sequences. Both are plain data, decoded
//! from JSON/TOML files or from the string a native plugin hands back.

use regex::Regex;
use serde::Deserialize;

use crate::highlight::HighlightCategory;

/// Decoded tokenizer rule table
#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerRuleTable {
    pub rules: Vec<TokenRuleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRuleSpec {
    #[serde(rename = "type")]
    pub token_type: String,
    pub pattern: String,
    #[serde(default)]
    pub highlight: Option<HighlightCategory>,
    /// Matched text is consumed without producing a token
    #[serde(default)]
    pub skip: bool,
}

#[derive(Debug, Clone)]
pub struct TokenRule {
    pub token_type: String,
    pub regex: Regex,
    pub highlight: Option<HighlightCategory>,
    pub skip: bool,
}

/// A loaded tokenizer plugin with its patterns compiled
#[derive(Debug, Clone)]
pub struct TokenizerPlugin {
    rules: Vec<TokenRule>,
}

impl TokenizerPlugin {
    pub fn compile(table: TokenizerRuleTable) -> Result<Self, String> {
        let rules = table
            .rules
            .into_iter()
            .map(|spec| {
                // Anchor so a rule only matches at the scan position.
                let regex = Regex::new(&format!(r"\A(?:{})", spec.pattern))
                    .map_err(|err| format!("rule '{}': {}", spec.token_type, err))?;
                Ok(TokenRule {
                    token_type: spec.token_type,
                    regex,
                    highlight: spec.highlight,
                    skip: spec.skip,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[TokenRule] {
        &self.rules
    }
}

/// One element of a parse rule's token sequence
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ElementSpec")]
pub struct SequenceElement {
    pub token: String,
    pub highlight: Option<HighlightCategory>,
    /// Match one or more consecutive tokens, grouped into one child list
    pub repeat: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ElementSpec {
    Token(String),
    Detailed {
        token: String,
        #[serde(default)]
        highlight: Option<HighlightCategory>,
        #[serde(default)]
        repeat: bool,
    },
}

impl From<ElementSpec> for SequenceElement {
    fn from(spec: ElementSpec) -> Self {
        match spec {
            ElementSpec::Token(token) => SequenceElement {
                token,
                highlight: None,
                repeat: false,
            },
            ElementSpec::Detailed {
                token,
                highlight,
                repeat,
            } => SequenceElement {
                token,
                highlight,
                repeat,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParseRule {
    pub name: String,
    pub sequence: Vec<SequenceElement>,
    #[serde(default)]
    pub highlight: Option<HighlightCategory>,
}

/// Decoded parser rule table
#[derive(Debug, Clone, Deserialize)]
pub struct ParserRuleTable {
    pub rules: Vec<ParseRule>,
}

/// A loaded parser plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserPlugin {
    rules: Vec<ParseRule>,
}

impl ParserPlugin {
    pub fn compile(table: ParserRuleTable) -> Result<Self, String> {
        if let Some(rule) = table.rules.iter().find(|rule| rule.sequence.is_empty()) {
            return Err(format!("rule '{}' has an empty sequence", rule.name));
        }
        Ok(Self { rules: table.rules })
    }

    pub fn rules(&self) -> &[ParseRule] {
        &self.rules
    }
}
