use super::settings::ServerSettings;

/// File name of a per-directory configuration
pub const CONFIG_FILE_NAME: &str = "infconfig.json";

/// Directory names never descended into while scanning or globbing
pub const DEFAULT_IGNORE: &[&str] = &["node_modules"];

/// Programmed defaults, the lowest settings layer
pub fn default_settings() -> ServerSettings {
    ServerSettings {
        ignore: DEFAULT_IGNORE.iter().map(|name| name.to_string()).collect(),
        semantic_tokens: true,
    }
}
