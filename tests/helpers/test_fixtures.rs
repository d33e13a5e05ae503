//! Workspace fixtures for integration tests.
//!
//! Builds a temporary directory holding an `infconfig.json`, a tokenizer
//! rule table and a parser rule table.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Splits words, numbers and `;`, skipping whitespace.
pub const WORD_RULES: &str = r#"{ "rules": [
    { "type": "word", "pattern": "[a-z]+", "highlight": "variable" },
    { "type": "semi", "pattern": ";", "highlight": "operator" },
    { "type": "ws", "pattern": "\\s+", "skip": true }
] }"#;

/// A statement is one or more words terminated by `;`.
pub const STATEMENT_GRAMMAR: &str = r#"{ "rules": [
    { "name": "statement", "sequence": [
        { "token": "word", "repeat": true },
        "semi"
    ] }
] }"#;

pub const TOKEN_AND_PARSER_CONFIG: &str =
    r#"{ "token": "rules/*.json", "parser": ["grammar/main.json"] }"#;

pub const TOKEN_ONLY_CONFIG: &str = r#"{ "token": "rules/*.json" }"#;

pub fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, contents).expect("Failed to write fixture file");
}

/// Write the rule tables under `dir` along with the given configuration.
pub fn write_plugin_dir(dir: &Path, config: &str) {
    write(&dir.join("rules/words.json"), WORD_RULES);
    write(&dir.join("grammar/main.json"), STATEMENT_GRAMMAR);
    write(&dir.join("infconfig.json"), config);
}

/// A temporary workspace configured with both tokenizer and parser plugins.
pub fn create_workspace_fixture() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_plugin_dir(dir.path(), TOKEN_AND_PARSER_CONFIG);
    dir
}
