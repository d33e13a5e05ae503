//! Error handling types for infinite-ls
//!
//! Every fallible boundary (configuration parsing, glob expansion, plugin
//! loading) returns [`LspResult`]; callers decide whether to propagate or
//! to log and continue with an empty result.

use std::path::{Path, PathBuf};
use std::sync::PoisonError;
use thiserror::Error;

/// Comprehensive error type for server operations
#[derive(Debug, Error)]
pub enum LspError {
    /// Configuration file could not be interpreted
    #[error("Invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// A glob pattern could not be compiled
    #[error("Invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    /// A plugin module could not be loaded
    #[error("Failed to load module {}: {message}", path.display())]
    ModuleLoad { path: PathBuf, message: String },

    /// JSON decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for server operations
pub type LspResult<T> = Result<T, LspError>;

/// Helper trait to convert PoisonError to LspError
pub trait LockResultExt<T> {
    /// Convert a PoisonError to LspError with recovery and logging.
    ///
    /// The context parameter identifies which operation triggered lock recovery.
    fn recover_poison(self, context: &str) -> Result<T, LspError>;
}

impl<T> LockResultExt<T> for Result<T, PoisonError<T>> {
    fn recover_poison(self, context: &str) -> Result<T, LspError> {
        match self {
            Ok(guard) => Ok(guard),
            Err(poisoned) => {
                log::warn!(
                    target: "infinite_ls::lock_recovery",
                    "Recovered from poisoned lock in {}",
                    context
                );
                Ok(poisoned.into_inner())
            }
        }
    }
}

/// Helper functions for common error patterns
impl LspError {
    /// Create a configuration error for the file at `path`
    pub fn config(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        LspError::Config {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn glob(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        LspError::Glob {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a module load error for the plugin at `path`
    pub fn module_load(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        LspError::ModuleLoad {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        LspError::Internal(message.into())
    }
}
