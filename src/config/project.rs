//! Per-directory `infconfig.json` files.
//!
//! A configuration file declares glob patterns for tokenizer and parser
//! plugins. Patterns are interpreted relative to the directory containing
//! the file, and that directory is the scope the configuration governs.

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LspError, LspResult};

/// One pattern or a list of patterns.
///
/// Older configuration files declare `"token": "rules/*.json"`, newer ones
/// use a list; both are accepted for either key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Patterns::One(pattern) => vec![pattern],
            Patterns::Many(patterns) => patterns,
        }
    }
}

/// On-disk shape of `infconfig.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub token: Option<Patterns>,
    #[serde(default)]
    pub parser: Option<Patterns>,
}

/// A parsed configuration bound to the directory it governs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub directory: PathBuf,
    pub token_patterns: Vec<String>,
    pub parser_patterns: Vec<String>,
}

impl Configuration {
    pub fn new(directory: impl AsRef<Path>, file: ConfigFile) -> Self {
        Self {
            directory: directory.as_ref().clean(),
            token_patterns: file.token.map(Patterns::into_vec).unwrap_or_default(),
            parser_patterns: file.parser.map(Patterns::into_vec).unwrap_or_default(),
        }
    }
}

/// Parse configuration `contents` read from `config_path`.
pub fn parse_configuration(config_path: &Path, contents: &str) -> LspResult<Configuration> {
    let directory = config_path
        .parent()
        .ok_or_else(|| LspError::config(config_path, "configuration file has no parent directory"))?;
    let file: ConfigFile = serde_json::from_str(contents)
        .map_err(|err| LspError::config(config_path, err.to_string()))?;
    Ok(Configuration::new(directory, file))
}

/// Read and parse the configuration file at `config_path`.
pub fn load_configuration(config_path: &Path) -> LspResult<Configuration> {
    let contents = fs::read_to_string(config_path)
        .map_err(|err| LspError::config(config_path, format!("failed to read: {err}")))?;
    parse_configuration(config_path, &contents)
}
