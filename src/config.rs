pub mod defaults;
pub mod project;
pub mod settings;

pub use defaults::{CONFIG_FILE_NAME, DEFAULT_IGNORE, default_settings};
pub use project::{Configuration, ConfigFile, Patterns, load_configuration, parse_configuration};
pub use settings::{ServerSettings, SettingsOverride, merge_settings};
