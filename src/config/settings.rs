use serde::{Deserialize, Serialize};

/// Settings layer as sent by the client.
///
/// Every field is optional so a layer only overrides what it names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOverride {
    /// Directory names skipped while scanning for configuration files and
    /// expanding plugin globs
    pub ignore: Option<Vec<String>>,
    /// Whether `textDocument/semanticTokens/full` produces tokens
    pub semantic_tokens: Option<bool>,
}

/// Effective server settings after all layers have been merged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub ignore: Vec<String>,
    pub semantic_tokens: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        super::defaults::default_settings()
    }
}

/// Apply `layers` on top of `base`; later layers win field by field.
pub fn merge_settings(base: ServerSettings, layers: &[Option<SettingsOverride>]) -> ServerSettings {
    layers
        .iter()
        .flatten()
        .fold(base, |mut merged, layer| {
            if let Some(ignore) = &layer.ignore {
                merged.ignore = ignore.clone();
            }
            if let Some(semantic_tokens) = layer.semantic_tokens {
                merged.semantic_tokens = semantic_tokens;
            }
            merged
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_settings;

    #[test]
    fn test_defaults_ignore_dependency_directories() {
        let settings = ServerSettings::default();
        assert_eq!(settings.ignore, vec!["node_modules".to_string()]);
        assert!(settings.semantic_tokens);
    }

    #[test]
    fn test_later_layers_override_earlier_ones() {
        let init = SettingsOverride {
            ignore: Some(vec!["vendor".to_string()]),
            semantic_tokens: Some(false),
        };
        let client = SettingsOverride {
            ignore: None,
            semantic_tokens: Some(true),
        };

        let merged = merge_settings(default_settings(), &[Some(init), None, Some(client)]);

        assert_eq!(merged.ignore, vec!["vendor".to_string()]);
        assert!(merged.semantic_tokens);
    }

    #[test]
    fn test_override_deserializes_camel_case() {
        let layer: SettingsOverride =
            serde_json::from_str(r#"{ "semanticTokens": false }"#).unwrap();
        assert_eq!(layer.semantic_tokens, Some(false));
        assert_eq!(layer.ignore, None);
    }
}
