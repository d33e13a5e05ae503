use std::path::{Path, PathBuf};

/// Events emitted by workspace scans and configuration reloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    Log {
        level: WorkspaceLogLevel,
        message: String,
    },
    /// The configuration rooted at `directory` was registered, replaced or removed
    ConfigurationChanged { directory: PathBuf },
}

impl WorkspaceEvent {
    pub fn log(level: WorkspaceLogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::log(WorkspaceLogLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::log(WorkspaceLogLevel::Warning, message)
    }

    pub fn configuration_changed(directory: impl AsRef<Path>) -> Self {
        Self::ConfigurationChanged {
            directory: directory.as_ref().to_path_buf(),
        }
    }
}

/// Log levels abstracted from LSP message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceLogLevel {
    Error,
    Warning,
    Info,
}

/// Outcome of a scan or reload
#[derive(Debug, Default)]
pub struct WorkspaceReport {
    pub events: Vec<WorkspaceEvent>,
}

impl WorkspaceReport {
    pub fn push_event(&mut self, event: WorkspaceEvent) {
        self.events.push(event);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push_event(WorkspaceEvent::warning(message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push_event(WorkspaceEvent::info(message));
    }

    pub fn merge(&mut self, other: WorkspaceReport) {
        self.events.extend(other.events);
    }

    /// Directories whose configuration changed, in event order
    pub fn changed_directories(&self) -> Vec<&Path> {
        self.events
            .iter()
            .filter_map(|event| match event {
                WorkspaceEvent::ConfigurationChanged { directory } => Some(directory.as_path()),
                WorkspaceEvent::Log { .. } => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            WorkspaceEvent::Log {
                level: WorkspaceLogLevel::Warning,
                message,
            } => Some(message.as_str()),
            _ => None,
        })
    }
}
