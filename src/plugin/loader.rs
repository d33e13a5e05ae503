use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::native;
use super::rules::{ParserPlugin, ParserRuleTable, TokenizerPlugin, TokenizerRuleTable};
use crate::error::{LspError, LspResult};

/// Which side of the pipeline a module serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Tokenizer,
    Parser,
}

impl PluginKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PluginKind::Tokenizer => "tokenizer",
            PluginKind::Parser => "parser",
        }
    }
}

/// A loaded plugin
#[derive(Debug, Clone)]
pub enum PluginValue {
    Tokenizer(Arc<TokenizerPlugin>),
    Parser(Arc<ParserPlugin>),
}

impl PluginValue {
    pub fn kind(&self) -> PluginKind {
        match self {
            PluginValue::Tokenizer(_) => PluginKind::Tokenizer,
            PluginValue::Parser(_) => PluginKind::Parser,
        }
    }
}

/// Loads one plugin module from an absolute path.
///
/// Implementations do not cache: every call reads the file again. Identity
/// and invalidation belong to [`super::ModuleRegistry`].
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path, kind: PluginKind) -> LspResult<PluginValue>;
}

/// Loads rule tables from `.json`, `.toml` or native library files
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleTableLoader;

impl RuleTableLoader {
    pub fn new() -> Self {
        Self
    }

    fn decode<T: DeserializeOwned>(&self, path: &Path) -> LspResult<T> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        if native::is_native_plugin(path) {
            let contents = native::read_rule_table(path)?;
            return serde_json::from_str(&contents)
                .map_err(|err| LspError::module_load(path, format!("invalid rule table: {err}")));
        }

        let read = || {
            fs::read_to_string(path)
                .map_err(|err| LspError::module_load(path, format!("failed to read: {err}")))
        };

        match extension {
            "json" => serde_json::from_str(&read()?)
                .map_err(|err| LspError::module_load(path, format!("invalid rule table: {err}"))),
            "toml" => toml::from_str(&read()?)
                .map_err(|err| LspError::module_load(path, format!("invalid rule table: {err}"))),
            other => Err(LspError::module_load(
                path,
                format!("unsupported plugin extension '{other}'"),
            )),
        }
    }
}

impl ModuleLoader for RuleTableLoader {
    fn load(&self, path: &Path, kind: PluginKind) -> LspResult<PluginValue> {
        let value = match kind {
            PluginKind::Tokenizer => {
                let table: TokenizerRuleTable = self.decode(path)?;
                let plugin = TokenizerPlugin::compile(table)
                    .map_err(|message| LspError::module_load(path, message))?;
                PluginValue::Tokenizer(Arc::new(plugin))
            }
            PluginKind::Parser => {
                let table: ParserRuleTable = self.decode(path)?;
                let plugin = ParserPlugin::compile(table)
                    .map_err(|message| LspError::module_load(path, message))?;
                PluginValue::Parser(Arc::new(plugin))
            }
        };

        log::debug!(
            target: "infinite_ls::loader",
            "Loaded {} module {}",
            kind.as_str(),
            path.display()
        );
        Ok(value)
    }
}
