//! Highlight categories and the semantic token legend.
//!
//! Tokens and syntax nodes carry an optional [`HighlightCategory`]. The
//! category decides the symbol kind reported by `textDocument/documentSymbol`
//! and the token type index used in semantic token encodings.

use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::{SemanticTokenModifier, SemanticTokenType, SymbolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightCategory {
    Namespace,
    Class,
    Enum,
    Interface,
    Struct,
    TypeParameter,
    Type,
    Parameter,
    Variable,
    Property,
    EnumMember,
    Decorator,
    Event,
    Function,
    Method,
    Macro,
    Label,
    Comment,
    String,
    Keyword,
    Number,
    Regexp,
    Operator,
}

impl HighlightCategory {
    /// All categories in legend order
    pub const ALL: [HighlightCategory; 23] = [
        HighlightCategory::Namespace,
        HighlightCategory::Class,
        HighlightCategory::Enum,
        HighlightCategory::Interface,
        HighlightCategory::Struct,
        HighlightCategory::TypeParameter,
        HighlightCategory::Type,
        HighlightCategory::Parameter,
        HighlightCategory::Variable,
        HighlightCategory::Property,
        HighlightCategory::EnumMember,
        HighlightCategory::Decorator,
        HighlightCategory::Event,
        HighlightCategory::Function,
        HighlightCategory::Method,
        HighlightCategory::Macro,
        HighlightCategory::Label,
        HighlightCategory::Comment,
        HighlightCategory::String,
        HighlightCategory::Keyword,
        HighlightCategory::Number,
        HighlightCategory::Regexp,
        HighlightCategory::Operator,
    ];

    /// Symbol kind reported for a token of this category
    pub fn symbol_kind(self) -> SymbolKind {
        match self {
            HighlightCategory::Namespace => SymbolKind::NAMESPACE,
            HighlightCategory::Class => SymbolKind::CLASS,
            HighlightCategory::Enum => SymbolKind::ENUM,
            HighlightCategory::Interface => SymbolKind::INTERFACE,
            HighlightCategory::Struct => SymbolKind::STRUCT,
            HighlightCategory::TypeParameter => SymbolKind::TYPE_PARAMETER,
            HighlightCategory::Type => SymbolKind::INTERFACE,
            HighlightCategory::Parameter => SymbolKind::VARIABLE,
            HighlightCategory::Variable => SymbolKind::VARIABLE,
            HighlightCategory::Property => SymbolKind::PROPERTY,
            HighlightCategory::EnumMember => SymbolKind::ENUM_MEMBER,
            HighlightCategory::Decorator => SymbolKind::PROPERTY,
            HighlightCategory::Event => SymbolKind::EVENT,
            HighlightCategory::Function => SymbolKind::FUNCTION,
            HighlightCategory::Method => SymbolKind::METHOD,
            HighlightCategory::Macro => SymbolKind::FUNCTION,
            HighlightCategory::Label => SymbolKind::VARIABLE,
            HighlightCategory::Comment => SymbolKind::VARIABLE,
            HighlightCategory::String => SymbolKind::STRING,
            HighlightCategory::Keyword => SymbolKind::KEY,
            HighlightCategory::Number => SymbolKind::NUMBER,
            HighlightCategory::Regexp => SymbolKind::VARIABLE,
            HighlightCategory::Operator => SymbolKind::OPERATOR,
        }
    }

    /// Index of this category in [`LEGEND_TYPES`]
    pub fn token_type_index(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        LEGEND_TYPES[self as usize].as_str()
    }
}

/// Semantic token types supported by the LSP legend.
///
/// Order matches the declaration order of [`HighlightCategory`].
pub const LEGEND_TYPES: &[SemanticTokenType] = &[
    SemanticTokenType::NAMESPACE,
    SemanticTokenType::CLASS,
    SemanticTokenType::ENUM,
    SemanticTokenType::INTERFACE,
    SemanticTokenType::STRUCT,
    SemanticTokenType::TYPE_PARAMETER,
    SemanticTokenType::TYPE,
    SemanticTokenType::PARAMETER,
    SemanticTokenType::VARIABLE,
    SemanticTokenType::PROPERTY,
    SemanticTokenType::ENUM_MEMBER,
    SemanticTokenType::DECORATOR,
    SemanticTokenType::EVENT,
    SemanticTokenType::FUNCTION,
    SemanticTokenType::METHOD,
    SemanticTokenType::MACRO,
    SemanticTokenType::new("label"),
    SemanticTokenType::COMMENT,
    SemanticTokenType::STRING,
    SemanticTokenType::KEYWORD,
    SemanticTokenType::NUMBER,
    SemanticTokenType::REGEXP,
    SemanticTokenType::OPERATOR,
];

/// Semantic token modifiers supported by the LSP legend.
///
/// No modifier is ever emitted; the list is advertised for client parity.
pub const LEGEND_MODIFIERS: &[SemanticTokenModifier] = &[
    SemanticTokenModifier::DECLARATION,
    SemanticTokenModifier::DEFINITION,
    SemanticTokenModifier::READONLY,
    SemanticTokenModifier::STATIC,
    SemanticTokenModifier::DEPRECATED,
    SemanticTokenModifier::ABSTRACT,
    SemanticTokenModifier::ASYNC,
    SemanticTokenModifier::MODIFICATION,
    SemanticTokenModifier::DOCUMENTATION,
    SemanticTokenModifier::DEFAULT_LIBRARY,
];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_legend_matches_category_order() {
        assert_eq!(LEGEND_TYPES.len(), HighlightCategory::ALL.len());
        for (index, category) in HighlightCategory::ALL.iter().enumerate() {
            assert_eq!(category.token_type_index() as usize, index);
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json.as_str(), Some(category.as_str()));
        }
    }

    #[rstest]
    #[case::string("string", SymbolKind::STRING)]
    #[case::number("number", SymbolKind::NUMBER)]
    #[case::type_alias("type", SymbolKind::INTERFACE)]
    #[case::type_parameter("typeParameter", SymbolKind::TYPE_PARAMETER)]
    #[case::enum_member("enumMember", SymbolKind::ENUM_MEMBER)]
    #[case::decorator("decorator", SymbolKind::PROPERTY)]
    #[case::macro_fn("macro", SymbolKind::FUNCTION)]
    #[case::keyword("keyword", SymbolKind::KEY)]
    #[case::comment("comment", SymbolKind::VARIABLE)]
    #[case::operator("operator", SymbolKind::OPERATOR)]
    fn test_symbol_kind_for_category(#[case] name: &str, #[case] expected: SymbolKind) {
        let category: HighlightCategory =
            serde_json::from_value(serde_json::Value::String(name.to_string())).unwrap();
        assert_eq!(category.symbol_kind(), expected);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let parsed = serde_json::from_str::<HighlightCategory>("\"sparkle\"");
        assert!(parsed.is_err());
    }
}
