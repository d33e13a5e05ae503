use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{ModuleLoader, PluginKind, PluginValue};
use super::rules::{ParserPlugin, TokenizerPlugin};
use crate::error::LspResult;

/// A module as held by the registry
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub path: PathBuf,
    pub value: PluginValue,
}

impl LoadedModule {
    pub fn kind(&self) -> PluginKind {
        self.value.kind()
    }
}

/// Loaded plugin instances keyed by absolute module path and role.
///
/// A file named as a tokenizer by one configuration and as a parser by
/// another holds two independent entries. The same key always maps to the
/// most recently loaded value.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: DashMap<(PathBuf, PluginKind), LoadedModule>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the module at `path` as `kind` and register it, replacing any
    /// previous entry for that role. On failure the previous entry for that
    /// role is removed so a broken plugin never keeps serving stale rules.
    pub fn reload(
        &self,
        loader: &dyn ModuleLoader,
        path: &Path,
        kind: PluginKind,
    ) -> LspResult<()> {
        match loader.load(path, kind) {
            Ok(value) => {
                self.insert(LoadedModule {
                    path: path.to_path_buf(),
                    value,
                });
                Ok(())
            }
            Err(err) => {
                self.remove(path, kind);
                Err(err)
            }
        }
    }

    pub fn insert(&self, module: LoadedModule) {
        self.modules
            .insert((module.path.clone(), module.kind()), module);
    }

    pub fn get(&self, path: &Path, kind: PluginKind) -> Option<LoadedModule> {
        self.modules
            .get(&(path.to_path_buf(), kind))
            .map(|entry| entry.value().clone())
    }

    pub fn remove(&self, path: &Path, kind: PluginKind) -> Option<LoadedModule> {
        self.modules
            .remove(&(path.to_path_buf(), kind))
            .map(|(_, module)| module)
    }

    pub fn tokenizer(&self, path: &Path) -> Option<Arc<TokenizerPlugin>> {
        match self.get(path, PluginKind::Tokenizer)?.value {
            PluginValue::Tokenizer(plugin) => Some(plugin),
            PluginValue::Parser(_) => None,
        }
    }

    pub fn parser(&self, path: &Path) -> Option<Arc<ParserPlugin>> {
        match self.get(path, PluginKind::Parser)?.value {
            PluginValue::Parser(plugin) => Some(plugin),
            PluginValue::Tokenizer(_) => None,
        }
    }

    /// Whether `path` is loaded in any role
    pub fn contains(&self, path: &Path) -> bool {
        [PluginKind::Tokenizer, PluginKind::Parser]
            .into_iter()
            .any(|kind| self.modules.contains_key(&(path.to_path_buf(), kind)))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
