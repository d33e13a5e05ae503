pub mod analysis;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod lsp;
pub mod plugin;
pub mod registry;
pub mod workspace;

pub use error::{LspError, LspResult};
pub use registry::PrefixRegistry;
pub use workspace::{ResolvedModuleSet, Workspace};

// Re-export the main server implementation
pub use lsp::InfiniteLs;
