//! Plugin discovery, loading and registration.

pub mod glob;
pub mod loader;
pub mod module_registry;
pub mod native;
pub mod rules;

pub use glob::GlobResolver;
pub use loader::{ModuleLoader, PluginKind, PluginValue, RuleTableLoader};
pub use module_registry::{LoadedModule, ModuleRegistry};
pub use rules::{
    ParseRule, ParserPlugin, ParserRuleTable, SequenceElement, TokenRule, TokenizerPlugin,
    TokenizerRuleTable,
};
