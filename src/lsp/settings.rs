use serde_json::Value;

use crate::config::{ServerSettings, SettingsOverride, default_settings, merge_settings};

/// Key under which clients may nest the server's settings
pub(crate) const SETTINGS_SECTION: &str = "infinite";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsSource {
    InitializationOptions,
    ClientConfiguration,
}

impl SettingsSource {
    fn description(self) -> &'static str {
        match self {
            SettingsSource::InitializationOptions => "initialization options",
            SettingsSource::ClientConfiguration => "client configuration",
        }
    }
}

#[derive(Default, Debug)]
pub struct SettingsLoadOutcome {
    pub layer: Option<SettingsOverride>,
    pub events: Vec<SettingsEvent>,
}

/// Interpret a settings payload sent by the client.
///
/// The payload is either the settings object itself or an object holding
/// it under the `infinite` key. `null` is treated as absent.
pub fn parse_settings_layer(source: SettingsSource, value: Value) -> SettingsLoadOutcome {
    let mut events = Vec::new();
    if value.is_null() {
        return SettingsLoadOutcome {
            layer: None,
            events,
        };
    }

    let value = match value {
        Value::Object(mut map) if map.contains_key(SETTINGS_SECTION) => {
            map.remove(SETTINGS_SECTION).unwrap_or(Value::Null)
        }
        other => other,
    };

    let layer = match serde_json::from_value::<SettingsOverride>(value) {
        Ok(layer) => {
            events.push(SettingsEvent::info(format!(
                "Parsed {} as server settings",
                source.description()
            )));
            Some(layer)
        }
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to parse {}: {}",
                source.description(),
                err
            )));
            None
        }
    };

    SettingsLoadOutcome { layer, events }
}

/// Merge layers over the defaults: initialization options, then client
/// configuration.
pub fn resolve_settings(
    initialization: Option<&SettingsOverride>,
    client: Option<&SettingsOverride>,
) -> ServerSettings {
    merge_settings(
        default_settings(),
        &[initialization.cloned(), client.cloned()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_settings() {
        let outcome = parse_settings_layer(
            SettingsSource::InitializationOptions,
            json!({ "ignore": ["target"], "semanticTokens": false }),
        );

        let layer = outcome.layer.unwrap();
        assert_eq!(layer.ignore, Some(vec!["target".to_string()]));
        assert_eq!(layer.semantic_tokens, Some(false));
        assert_eq!(outcome.events[0].kind, SettingsEventKind::Info);
    }

    #[test]
    fn test_parse_nested_section() {
        let outcome = parse_settings_layer(
            SettingsSource::ClientConfiguration,
            json!({ "infinite": { "semanticTokens": false } }),
        );
        assert_eq!(outcome.layer.unwrap().semantic_tokens, Some(false));
    }

    #[test]
    fn test_invalid_payload_is_warning() {
        let outcome = parse_settings_layer(
            SettingsSource::ClientConfiguration,
            json!({ "ignore": "not-a-list" }),
        );
        assert!(outcome.layer.is_none());
        assert_eq!(outcome.events[0].kind, SettingsEventKind::Warning);
    }

    #[test]
    fn test_null_payload_is_absent() {
        let outcome = parse_settings_layer(SettingsSource::InitializationOptions, Value::Null);
        assert!(outcome.layer.is_none());
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_client_layer_overrides_initialization() {
        let init = SettingsOverride {
            ignore: Some(vec!["vendor".to_string()]),
            semantic_tokens: Some(false),
        };
        let client = SettingsOverride {
            ignore: None,
            semantic_tokens: Some(true),
        };

        let settings = resolve_settings(Some(&init), Some(&client));
        assert_eq!(settings.ignore, vec!["vendor".to_string()]);
        assert!(settings.semantic_tokens);
    }
}
