//! Configuration resolution state shared by the server.
//!
//! [`Workspace`] owns the configuration store, the module registry, the glob
//! resolver and the module loader. All operations are synchronous and may
//! touch the filesystem; the server runs them on blocking threads.

pub mod config_store;
pub mod events;
pub mod watcher;

pub use config_store::{ConfigEntry, ConfigStore};
pub use events::{WorkspaceEvent, WorkspaceLogLevel, WorkspaceReport};
pub use watcher::{ChangeKind, ConfigChange};

use arc_swap::ArcSwap;
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::{CONFIG_FILE_NAME, Configuration, DEFAULT_IGNORE, load_configuration};
use crate::plugin::{
    GlobResolver, ModuleLoader, ModuleRegistry, ParserPlugin, PluginKind, RuleTableLoader,
    TokenizerPlugin,
};

/// Modules governing one document, in pattern order then match order
#[derive(Debug, Clone)]
pub struct ResolvedModuleSet {
    /// Directory of the configuration that matched
    pub directory: PathBuf,
    pub tokenizer_modules: Vec<Arc<TokenizerPlugin>>,
    pub parser_modules: Vec<Arc<ParserPlugin>>,
}

pub struct Workspace {
    configs: ConfigStore,
    modules: ModuleRegistry,
    resolver: ArcSwap<GlobResolver>,
    loader: Arc<dyn ModuleLoader>,
    roots: RwLock<Vec<PathBuf>>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("configs", &self.configs)
            .field("modules", &self.modules)
            .field("resolver", &*self.resolver.load_full())
            .finish_non_exhaustive()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Arc::new(RuleTableLoader::new()), DEFAULT_IGNORE.iter().copied())
    }
}

impl Workspace {
    pub fn new<I, S>(loader: Arc<dyn ModuleLoader>, ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            configs: ConfigStore::new(),
            modules: ModuleRegistry::new(),
            resolver: ArcSwap::from_pointee(GlobResolver::new(ignored)),
            loader,
            roots: RwLock::new(Vec::new()),
        }
    }

    pub fn configs(&self) -> &ConfigStore {
        &self.configs
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Replace the set of directory names pruned from every walk.
    pub fn set_ignored(&self, ignored: &[String]) {
        self.resolver
            .store(Arc::new(GlobResolver::new(ignored.iter().cloned())));
    }

    pub fn roots(&self) -> Vec<PathBuf> {
        match self.roots.read() {
            Ok(roots) => roots.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Track `root` and register every configuration file below it.
    pub fn add_root(&self, root: &Path) -> WorkspaceReport {
        let root = root.clean();
        {
            let mut roots = match self.roots.write() {
                Ok(roots) => roots,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !roots.contains(&root) {
                roots.push(root.clone());
            }
        }
        self.scan_root(&root)
    }

    /// Stop tracking `root` and evict the configurations below it.
    pub fn remove_root(&self, root: &Path) -> WorkspaceReport {
        let root = root.clean();
        {
            let mut roots = match self.roots.write() {
                Ok(roots) => roots,
                Err(poisoned) => poisoned.into_inner(),
            };
            roots.retain(|known| known != &root);
        }

        let mut report = WorkspaceReport::default();
        let entries = match self.configs.entries() {
            Ok(entries) => entries,
            Err(err) => {
                report.warn(err.to_string());
                return report;
            }
        };
        for entry in entries
            .iter()
            .filter(|entry| entry.directory().starts_with(&root))
        {
            report.merge(self.evict_directory(entry.directory()));
        }
        report
    }

    /// Scan every tracked root again, e.g. after the ignore-set changed.
    pub fn rescan(&self) -> WorkspaceReport {
        let mut report = WorkspaceReport::default();
        for root in self.roots() {
            report.merge(self.scan_root(&root));
        }
        report
    }

    /// Register every configuration file found below `root`.
    ///
    /// A malformed configuration is reported and skipped; the scan goes on.
    pub fn scan_root(&self, root: &Path) -> WorkspaceReport {
        let resolver = self.resolver.load_full();
        let mut report = WorkspaceReport::default();

        let files = resolver.find_files_named(root, CONFIG_FILE_NAME);
        log::info!(
            target: "infinite_ls::workspace",
            "Found {} configuration file(s) under {}",
            files.len(),
            root.display()
        );
        for file in files {
            report.merge(self.apply_config_file(&file));
        }
        report
    }

    /// Read, parse and register the configuration file at `path`,
    /// replacing whatever was registered for its directory.
    ///
    /// When the file cannot be read or parsed the directory is left
    /// unconfigured.
    pub fn apply_config_file(&self, path: &Path) -> WorkspaceReport {
        match load_configuration(path) {
            Ok(config) => self.register(config),
            Err(err) => {
                let mut report = WorkspaceReport::default();
                log::warn!(target: "infinite_ls::workspace", "{}", err);
                report.warn(err.to_string());
                report.merge(self.evict_config_file(path));
                report
            }
        }
    }

    /// Expand and load the modules of `config`, then register it.
    pub fn register(&self, config: Configuration) -> WorkspaceReport {
        let mut report = WorkspaceReport::default();
        let directory = config.directory.clone();

        let token_modules = self.load_modules(
            &directory,
            &config.token_patterns,
            PluginKind::Tokenizer,
            &mut report,
        );
        let parser_modules = self.load_modules(
            &directory,
            &config.parser_patterns,
            PluginKind::Parser,
            &mut report,
        );

        let message = format!(
            "Configured {} with {} tokenizer and {} parser module(s)",
            directory.display(),
            token_modules.len(),
            parser_modules.len()
        );
        let entry = ConfigEntry {
            config,
            token_modules,
            parser_modules,
        };
        match self.configs.set(entry) {
            Ok(Some(previous)) => self.prune_modules(&previous, &mut report),
            Ok(None) => {}
            Err(err) => {
                report.warn(err.to_string());
                return report;
            }
        }

        log::info!(target: "infinite_ls::workspace", "{}", message);
        report.info(message);
        report.push_event(WorkspaceEvent::configuration_changed(&directory));
        report
    }

    /// Forget the configuration file at `path` and every module no other
    /// configuration still references.
    pub fn evict_config_file(&self, path: &Path) -> WorkspaceReport {
        match path.parent() {
            Some(directory) => self.evict_directory(&directory.clean()),
            None => WorkspaceReport::default(),
        }
    }

    fn evict_directory(&self, directory: &Path) -> WorkspaceReport {
        let mut report = WorkspaceReport::default();
        let removed = match self.configs.delete(directory) {
            Ok(Some(entry)) => entry,
            Ok(None) => return report,
            Err(err) => {
                report.warn(err.to_string());
                return report;
            }
        };

        self.prune_modules(&removed, &mut report);

        let message = format!("Removed configuration for {}", directory.display());
        log::info!(target: "infinite_ls::workspace", "{}", message);
        report.info(message);
        report.push_event(WorkspaceEvent::configuration_changed(directory));
        report
    }

    /// Drop the modules of a replaced or removed `entry` that no registered
    /// configuration loads in the same role any more.
    fn prune_modules(&self, entry: &ConfigEntry, report: &mut WorkspaceReport) {
        for (module, kind) in entry.modules() {
            match self.configs.references(module, kind) {
                Ok(true) => {}
                Ok(false) => {
                    if self.modules.remove(module, kind).is_some() {
                        log::debug!(
                            target: "infinite_ls::workspace",
                            "Unloaded {} module {}",
                            kind.as_str(),
                            module.display()
                        );
                    }
                }
                Err(err) => report.warn(err.to_string()),
            }
        }
    }

    /// Modules governing the document at `path`, or `None` when no
    /// configuration covers it.
    pub fn resolve_for_document(&self, path: &Path) -> Option<ResolvedModuleSet> {
        let directory = path.parent()?.clean();
        let entry = match self.configs.search(&directory) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                log::debug!(
                    target: "infinite_ls::workspace",
                    "No configuration governs {}",
                    path.display()
                );
                return None;
            }
            Err(err) => {
                log::warn!(target: "infinite_ls::workspace", "{}", err);
                return None;
            }
        };

        let tokenizer_modules = entry
            .token_modules
            .iter()
            .filter_map(|module| self.modules.tokenizer(module))
            .collect();
        let parser_modules = entry
            .parser_modules
            .iter()
            .filter_map(|module| self.modules.parser(module))
            .collect();

        Some(ResolvedModuleSet {
            directory: entry.directory().to_path_buf(),
            tokenizer_modules,
            parser_modules,
        })
    }

    /// Expand `patterns` under `directory` and load each match as `kind`.
    ///
    /// Returns the absolute paths of the modules that loaded; failures are
    /// reported and excluded.
    fn load_modules(
        &self,
        directory: &Path,
        patterns: &[String],
        kind: PluginKind,
        report: &mut WorkspaceReport,
    ) -> Vec<PathBuf> {
        let resolver = self.resolver.load_full();
        let relative = match resolver.expand(directory, patterns) {
            Ok(paths) => paths,
            Err(_) => {
                // Retry pattern by pattern so one bad glob does not hide the rest.
                let mut paths: Vec<PathBuf> = Vec::new();
                for pattern in patterns {
                    match resolver.expand(directory, std::slice::from_ref(pattern)) {
                        Ok(found) => {
                            for path in found {
                                if !paths.contains(&path) {
                                    paths.push(path);
                                }
                            }
                        }
                        Err(err) => {
                            log::warn!(target: "infinite_ls::workspace", "{}", err);
                            report.warn(format!("{} (in {})", err, directory.display()));
                        }
                    }
                }
                paths
            }
        };

        let mut loaded = Vec::with_capacity(relative.len());
        for path in relative {
            let absolute = directory.join(path).clean();
            match self.modules.reload(self.loader.as_ref(), &absolute, kind) {
                Ok(()) => loaded.push(absolute),
                Err(err) => {
                    log::warn!(target: "infinite_ls::workspace", "{}", err);
                    report.warn(err.to_string());
                }
            }
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const WORDS: &str = r#"{ "rules": [ { "type": "word", "pattern": "[a-z]+" } ] }"#;
    const GRAMMAR: &str = r#"{ "rules": [ { "name": "stmt", "sequence": ["word"] } ] }"#;

    fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).expect("failed to create dirs");
        fs::write(&path, contents).expect("failed to write file");
        path
    }

    #[test]
    fn test_register_loads_modules_in_pattern_order() {
        let dir = TempDir::new().expect("failed to create temp dir");
        write(dir.path(), "rules/b.json", WORDS);
        write(dir.path(), "rules/a.json", WORDS);
        write(dir.path(), "grammar/main.json", GRAMMAR);
        write(
            dir.path(),
            CONFIG_FILE_NAME,
            r#"{ "token": "rules/*.json", "parser": ["grammar/main.json"] }"#,
        );

        let workspace = Workspace::default();
        let report = workspace.add_root(dir.path());
        assert_eq!(report.warnings().count(), 0);

        let root = dir.path().clean();
        let entry = workspace.configs().get(&root).unwrap().unwrap();
        assert_eq!(
            entry.token_modules,
            vec![root.join("rules/a.json"), root.join("rules/b.json")]
        );
        assert_eq!(entry.parser_modules, vec![root.join("grammar/main.json")]);

        let resolved = workspace
            .resolve_for_document(&root.join("src/doc.txt"))
            .unwrap();
        assert_eq!(resolved.tokenizer_modules.len(), 2);
        assert_eq!(resolved.parser_modules.len(), 1);
    }

    #[test]
    fn test_broken_module_is_excluded() {
        let dir = TempDir::new().expect("failed to create temp dir");
        write(dir.path(), "rules/a.json", WORDS);
        write(dir.path(), "rules/broken.json", r#"{ "nothing": [] }"#);
        write(dir.path(), CONFIG_FILE_NAME, r#"{ "token": "rules/*.json" }"#);

        let workspace = Workspace::default();
        let report = workspace.add_root(dir.path());

        assert_eq!(report.warnings().count(), 1);
        let resolved = workspace
            .resolve_for_document(&dir.path().join("doc.txt"))
            .unwrap();
        assert_eq!(resolved.tokenizer_modules.len(), 1);
    }

    #[test]
    fn test_invalid_glob_keeps_other_patterns() {
        let dir = TempDir::new().expect("failed to create temp dir");
        write(dir.path(), "rules/a.json", WORDS);
        write(
            dir.path(),
            CONFIG_FILE_NAME,
            r#"{ "token": ["rules/[", "rules/*.json"] }"#,
        );

        let workspace = Workspace::default();
        let report = workspace.add_root(dir.path());

        assert_eq!(report.warnings().count(), 1);
        let resolved = workspace
            .resolve_for_document(&dir.path().join("doc.txt"))
            .unwrap();
        assert_eq!(resolved.tokenizer_modules.len(), 1);
    }

    #[test]
    fn test_evict_prunes_unreferenced_modules() {
        let dir = TempDir::new().expect("failed to create temp dir");
        write(dir.path(), "a/shared.json", WORDS);
        write(dir.path(), "a/own.json", WORDS);
        let config_a = write(
            dir.path(),
            &format!("a/{CONFIG_FILE_NAME}"),
            r#"{ "token": ["shared.json", "own.json"] }"#,
        );
        write(dir.path(), CONFIG_FILE_NAME, r#"{ "token": "a/shared.json" }"#);

        let workspace = Workspace::default();
        workspace.add_root(dir.path());
        let root = dir.path().clean();
        assert!(workspace.modules().contains(&root.join("a/own.json")));

        let report = workspace.evict_config_file(&config_a);
        assert_eq!(report.changed_directories(), vec![root.join("a").as_path()]);
        assert!(!workspace.modules().contains(&root.join("a/own.json")));
        assert!(workspace.modules().contains(&root.join("a/shared.json")));

        // The document now falls back to the root configuration.
        let resolved = workspace
            .resolve_for_document(&root.join("a/doc.txt"))
            .unwrap();
        assert_eq!(resolved.directory, root);
    }

    #[test]
    fn test_reload_prunes_modules_it_no_longer_names() {
        let dir = TempDir::new().expect("failed to create temp dir");
        write(dir.path(), "rules/a.json", WORDS);
        write(dir.path(), "rules/b.json", WORDS);
        let config = write(
            dir.path(),
            CONFIG_FILE_NAME,
            r#"{ "token": ["rules/a.json", "rules/b.json"] }"#,
        );

        let workspace = Workspace::default();
        workspace.add_root(dir.path());
        let root = dir.path().clean();
        assert_eq!(workspace.modules().len(), 2);

        write(dir.path(), CONFIG_FILE_NAME, r#"{ "token": ["rules/a.json"] }"#);
        workspace.apply_config_file(&config);
        assert_eq!(workspace.modules().len(), 1);
        assert!(workspace.modules().contains(&root.join("rules/a.json")));
        assert!(!workspace.modules().contains(&root.join("rules/b.json")));

        write(dir.path(), CONFIG_FILE_NAME, "{ broken");
        let report = workspace.apply_config_file(&config);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.changed_directories(), vec![root.as_path()]);
        assert!(workspace.configs().is_empty());
        assert!(workspace.modules().is_empty());
    }

    #[test]
    fn test_patterns_may_leave_the_config_directory() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let shared = write(dir.path(), "shared/words.json", WORDS);
        write(dir.path(), "grammar/main.json", GRAMMAR);
        let absolute_grammar = dir.path().join("grammar/main.json");
        write(
            dir.path(),
            &format!("proj/{CONFIG_FILE_NAME}"),
            &serde_json::json!({
                "token": ["../shared/*.json"],
                "parser": [absolute_grammar.display().to_string()]
            })
            .to_string(),
        );

        let workspace = Workspace::default();
        let report = workspace.scan_root(&dir.path().join("proj"));
        assert_eq!(report.warnings().count(), 0);

        let root = dir.path().clean();
        let entry = workspace.configs().get(&root.join("proj")).unwrap().unwrap();
        assert_eq!(entry.token_modules, vec![shared.clean()]);
        assert_eq!(entry.parser_modules, vec![absolute_grammar.clean()]);

        let resolved = workspace
            .resolve_for_document(&root.join("proj/doc.txt"))
            .unwrap();
        assert_eq!(resolved.tokenizer_modules.len(), 1);
        assert_eq!(resolved.parser_modules.len(), 1);
    }

    #[test]
    fn test_one_file_in_two_roles() {
        let dir = TempDir::new().expect("failed to create temp dir");
        write(dir.path(), "rules/words.json", WORDS);
        write(dir.path(), CONFIG_FILE_NAME, r#"{ "token": "rules/words.json" }"#);
        // Decoding a tokenizer table as a parser fails; the tokenizer entry
        // the root configuration uses must survive.
        write(
            dir.path(),
            &format!("sub/{CONFIG_FILE_NAME}"),
            r#"{ "parser": "../rules/words.json" }"#,
        );

        let workspace = Workspace::default();
        let report = workspace.add_root(dir.path());
        assert_eq!(report.warnings().count(), 1);

        let resolved = workspace
            .resolve_for_document(&dir.path().join("doc.txt"))
            .unwrap();
        assert_eq!(resolved.tokenizer_modules.len(), 1);
    }

    #[test]
    fn test_unconfigured_document_is_unresolved() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let workspace = Workspace::default();
        workspace.add_root(dir.path());

        assert!(
            workspace
                .resolve_for_document(&dir.path().join("doc.txt"))
                .is_none()
        );
    }

    #[test]
    fn test_remove_root_evicts_its_configurations() {
        let dir = TempDir::new().expect("failed to create temp dir");
        write(dir.path(), CONFIG_FILE_NAME, r#"{}"#);

        let workspace = Workspace::default();
        workspace.add_root(dir.path());
        assert_eq!(workspace.configs().len(), 1);

        workspace.remove_root(dir.path());
        assert!(workspace.configs().is_empty());
        assert!(workspace.roots().is_empty());
    }
}
