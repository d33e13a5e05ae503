use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::Configuration;
use crate::error::{LockResultExt, LspResult};
use crate::plugin::PluginKind;
use crate::registry::PrefixRegistry;

/// A registered configuration together with the modules its patterns
/// expanded to, as absolute paths in pattern order then match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub config: Configuration,
    pub token_modules: Vec<PathBuf>,
    pub parser_modules: Vec<PathBuf>,
}

impl ConfigEntry {
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    pub fn modules_of(&self, kind: PluginKind) -> &[PathBuf] {
        match kind {
            PluginKind::Tokenizer => &self.token_modules,
            PluginKind::Parser => &self.parser_modules,
        }
    }

    /// Every module of this entry together with the role it is loaded in
    pub fn modules(&self) -> impl Iterator<Item = (&Path, PluginKind)> {
        let tokens = self
            .token_modules
            .iter()
            .map(|path| (path.as_path(), PluginKind::Tokenizer));
        let parsers = self
            .parser_modules
            .iter()
            .map(|path| (path.as_path(), PluginKind::Parser));
        tokens.chain(parsers)
    }

    /// Whether `module` is listed by this entry in the role `kind`
    pub fn references(&self, module: &Path, kind: PluginKind) -> bool {
        self.modules_of(kind).iter().any(|path| path == module)
    }
}

/// Configurations keyed by the directory holding their file
#[derive(Debug, Default)]
pub struct ConfigStore {
    entries: RwLock<PrefixRegistry<Arc<ConfigEntry>>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` under its directory, replacing any previous one.
    pub fn set(&self, entry: ConfigEntry) -> LspResult<Option<Arc<ConfigEntry>>> {
        let mut entries = self.entries.write().recover_poison("config_store::set")?;
        let directory = entry.directory().to_path_buf();
        Ok(entries.set(directory, Arc::new(entry)))
    }

    pub fn get(&self, directory: &Path) -> LspResult<Option<Arc<ConfigEntry>>> {
        let entries = self.entries.read().recover_poison("config_store::get")?;
        Ok(entries.get(directory).cloned())
    }

    pub fn delete(&self, directory: &Path) -> LspResult<Option<Arc<ConfigEntry>>> {
        let mut entries = self.entries.write().recover_poison("config_store::delete")?;
        Ok(entries.delete(directory))
    }

    /// Nearest configuration governing `directory`.
    pub fn search(&self, directory: &Path) -> LspResult<Option<Arc<ConfigEntry>>> {
        let entries = self.entries.read().recover_poison("config_store::search")?;
        Ok(entries.search(directory).map(|(_, entry)| Arc::clone(entry)))
    }

    pub fn entries(&self) -> LspResult<Vec<Arc<ConfigEntry>>> {
        let entries = self.entries.read().recover_poison("config_store::entries")?;
        Ok(entries.iter().map(|(_, entry)| Arc::clone(entry)).collect())
    }

    /// Whether any registered configuration loads `module` as `kind`
    pub fn references(&self, module: &Path, kind: PluginKind) -> LspResult<bool> {
        let entries = self.entries.read().recover_poison("config_store::references")?;
        Ok(entries.iter().any(|(_, entry)| entry.references(module, kind)))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .recover_poison("config_store::len")
            .map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
