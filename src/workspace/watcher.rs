//! Live reload of configuration files.
//!
//! Each file-change notification is classified on its own; only
//! `infconfig.json` files on the local filesystem are acted upon.

use std::path::PathBuf;
use url::Url;

use super::{Workspace, WorkspaceReport};
use crate::config::CONFIG_FILE_NAME;

/// Kind of change reported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChange {
    /// The file was created or modified and must be registered again
    Updated(PathBuf),
    /// The file is gone
    Removed(PathBuf),
    Ignored,
}

impl ConfigChange {
    pub fn classify(uri: &Url, kind: ChangeKind) -> Self {
        if uri.scheme() != "file" {
            log::debug!(target: "infinite_ls::watcher", "Ignoring non-file change {}", uri);
            return ConfigChange::Ignored;
        }
        let Ok(path) = uri.to_file_path() else {
            log::debug!(target: "infinite_ls::watcher", "Ignoring unmappable uri {}", uri);
            return ConfigChange::Ignored;
        };
        if path.file_name().is_none_or(|name| name != CONFIG_FILE_NAME) {
            log::debug!(
                target: "infinite_ls::watcher",
                "Ignoring change to {}",
                path.display()
            );
            return ConfigChange::Ignored;
        }

        match kind {
            ChangeKind::Created | ChangeKind::Changed => ConfigChange::Updated(path),
            ChangeKind::Deleted => ConfigChange::Removed(path),
        }
    }

    pub fn apply(&self, workspace: &Workspace) -> WorkspaceReport {
        match self {
            ConfigChange::Updated(path) => {
                log::info!(
                    target: "infinite_ls::watcher",
                    "Reloading configuration {}",
                    path.display()
                );
                workspace.apply_config_file(path)
            }
            ConfigChange::Removed(path) => {
                log::info!(
                    target: "infinite_ls::watcher",
                    "Configuration {} was deleted",
                    path.display()
                );
                workspace.evict_config_file(path)
            }
            ConfigChange::Ignored => WorkspaceReport::default(),
        }
    }
}
