use std::path::Path;
use std::sync::Arc;

use tower_lsp_server::ls_types::{Diagnostic, SemanticTokens, SymbolInformation, Uri};

use super::diagnostics::{parse_error_diagnostics, token_error_diagnostics};
use super::semantic::HighlightMap;
use super::symbols::token_symbols;
use crate::engine::{LanguageEngine, SyntaxNode, Token};
use crate::workspace::{ResolvedModuleSet, Workspace};

/// Result of running a document through the resolved modules
#[derive(Debug, Default)]
pub struct DocumentAnalysis {
    /// `None` when the document is unconfigured or tokenization failed
    pub tokens: Option<Vec<Token>>,
    /// `None` unless at least one parser module resolved and parsing succeeded
    pub tree: Option<SyntaxNode>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Tokenize → parse → render, against the modules governing a document.
#[derive(Clone)]
pub struct DocumentPipeline {
    workspace: Arc<Workspace>,
    engine: Arc<dyn LanguageEngine>,
}

impl std::fmt::Debug for DocumentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentPipeline")
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

impl DocumentPipeline {
    pub fn new(workspace: Arc<Workspace>, engine: Arc<dyn LanguageEngine>) -> Self {
        Self { workspace, engine }
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    fn resolve(&self, path: &Path) -> Option<ResolvedModuleSet> {
        let resolved = self.workspace.resolve_for_document(path);
        if resolved.is_none() {
            log::info!(
                target: "infinite_ls::pipeline",
                "No configuration found for {}",
                path.display()
            );
        }
        resolved
    }

    /// Run the whole pipeline, stopping at the first failing stage.
    pub fn analyze(&self, path: &Path, text: &str) -> DocumentAnalysis {
        let Some(modules) = self.resolve(path) else {
            return DocumentAnalysis::default();
        };

        let tokens = match self.engine.tokenize(text, &modules.tokenizer_modules) {
            Ok(tokens) => tokens,
            Err(errors) => {
                log::debug!(
                    target: "infinite_ls::pipeline",
                    "{} unrecognised span(s) in {}",
                    errors.len(),
                    path.display()
                );
                return DocumentAnalysis {
                    diagnostics: token_error_diagnostics(text, &errors),
                    ..Default::default()
                };
            }
        };

        if modules.parser_modules.is_empty() {
            return DocumentAnalysis {
                tokens: Some(tokens),
                ..Default::default()
            };
        }

        match self.engine.parse(&tokens, &modules.parser_modules) {
            Ok(tree) => DocumentAnalysis {
                tokens: Some(tokens),
                tree: Some(tree),
                diagnostics: Vec::new(),
            },
            Err(errors) => {
                log::debug!(
                    target: "infinite_ls::pipeline",
                    "{} parse error(s) in {}",
                    errors.len(),
                    path.display()
                );
                DocumentAnalysis {
                    tokens: Some(tokens),
                    tree: None,
                    diagnostics: parse_error_diagnostics(text, &errors),
                }
            }
        }
    }

    /// Diagnostics to publish for the document; empty when it is valid or
    /// unconfigured.
    pub fn diagnostics(&self, path: &Path, text: &str) -> Vec<Diagnostic> {
        self.analyze(path, text).diagnostics
    }

    /// Highlighted tokens as a flat symbol list. Parsing is not needed.
    pub fn document_symbols(&self, uri: &Uri, path: &Path, text: &str) -> Vec<SymbolInformation> {
        let Some(modules) = self.resolve(path) else {
            return Vec::new();
        };
        match self.engine.tokenize(text, &modules.tokenizer_modules) {
            Ok(tokens) => token_symbols(uri, text, &tokens),
            Err(_) => Vec::new(),
        }
    }

    /// Token highlights overlaid with syntax-node highlights.
    pub fn semantic_tokens(&self, path: &Path, text: &str) -> SemanticTokens {
        let analysis = self.analyze(path, text);
        let mut highlights = HighlightMap::new();
        if let Some(tokens) = &analysis.tokens {
            highlights.extend_tokens(tokens);
        }
        if let Some(tree) = &analysis.tree {
            highlights.extend_tree(tree);
        }
        highlights.encode(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::engine::RuleEngine;
    use std::fs;
    use tempfile::TempDir;

    const WORDS: &str = r#"{ "rules": [
        { "type": "word", "pattern": "[a-z]+", "highlight": "variable" },
        { "type": "ws", "pattern": "\\s+", "skip": true }
    ] }"#;

    fn pipeline(dir: &TempDir, config: &str) -> DocumentPipeline {
        let rules = dir.path().join("rules");
        fs::create_dir_all(&rules).unwrap();
        fs::write(rules.join("words.json"), WORDS).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), config).unwrap();

        let workspace = Arc::new(Workspace::default());
        workspace.add_root(dir.path());
        DocumentPipeline::new(workspace, Arc::new(RuleEngine))
    }

    #[test]
    fn test_unconfigured_document_has_no_output() {
        let dir = TempDir::new().unwrap();
        let pipeline = DocumentPipeline::new(Arc::new(Workspace::default()), Arc::new(RuleEngine));
        let path = dir.path().join("doc.txt");

        assert!(pipeline.diagnostics(&path, "anything").is_empty());
        assert!(pipeline.semantic_tokens(&path, "anything").data.is_empty());
    }

    #[test]
    fn test_without_parser_modules_parse_is_skipped() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, r#"{ "token": "rules/*.json" }"#);

        let analysis = pipeline.analyze(&dir.path().join("doc.txt"), "abc def");
        assert_eq!(analysis.tokens.map(|t| t.len()), Some(2));
        assert!(analysis.tree.is_none());
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_text_is_reported() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, r#"{ "token": "rules/*.json" }"#);

        let diagnostics = pipeline.diagnostics(&dir.path().join("doc.txt"), "abc 42");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Unknown token: 42");
    }

    #[test]
    fn test_semantic_tokens_from_tokens() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, r#"{ "token": "rules/*.json" }"#);

        let tokens = pipeline.semantic_tokens(&dir.path().join("doc.txt"), "abc de");
        assert_eq!(tokens.data.len(), 2);
        assert_eq!(tokens.data[1].delta_start, 4);
        assert_eq!(tokens.data[1].length, 2);
    }
}
