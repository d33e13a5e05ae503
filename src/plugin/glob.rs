use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use path_clean::PathClean;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::{LspError, LspResult};

/// Expands declarative glob patterns against a base directory.
///
/// Directories whose name is in the ignore-set are pruned from the walk,
/// so dependency trees are never matched or descended into.
#[derive(Debug, Clone)]
pub struct GlobResolver {
    ignored: Arc<HashSet<String>>,
}

/// A pattern split at its first glob component
struct CompiledPattern {
    /// Literal directory part as written: relative to the base, or absolute
    prefix: PathBuf,
    /// Glob for the rest of the path; `None` when the pattern is literal
    matcher: Option<GlobMatcher>,
}

impl GlobResolver {
    pub fn new<I, S>(ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored: Arc::new(ignored.into_iter().map(Into::into).collect()),
        }
    }

    /// Expand `patterns` relative to `base`.
    ///
    /// Returns paths relative to `base` in pattern order; matches of a
    /// single pattern are sorted. Patterns may climb out of `base` with
    /// `..` or be absolute; such matches keep that form, so
    /// `base.join(path)` always names the file. A path matched by several
    /// patterns is kept at its first position only. An empty pattern list
    /// yields no paths.
    pub fn expand(&self, base: &Path, patterns: &[String]) -> LspResult<Vec<PathBuf>> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let compiled = patterns
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<LspResult<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let mut expanded = Vec::new();
        for pattern in &compiled {
            for file in self.expand_one(base, pattern) {
                if seen.insert(file.clone()) {
                    expanded.push(file);
                }
            }
        }
        Ok(expanded)
    }

    fn expand_one(&self, base: &Path, pattern: &CompiledPattern) -> Vec<PathBuf> {
        let start = base.join(&pattern.prefix).clean();
        let Some(matcher) = &pattern.matcher else {
            return if start.is_file() {
                vec![pattern.prefix.clean()]
            } else {
                Vec::new()
            };
        };
        if !start.is_dir() {
            return Vec::new();
        }

        self.walk_files(&start)
            .into_iter()
            .filter(|file| matcher.is_match(file))
            .map(|file| pattern.prefix.join(file).clean())
            .collect()
    }

    /// Recursively find files named `file_name` below `root`, as absolute paths.
    pub fn find_files_named(&self, root: &Path, file_name: &str) -> Vec<PathBuf> {
        self.walk_files(root)
            .into_iter()
            .filter(|relative| relative.file_name().is_some_and(|name| name == file_name))
            .map(|relative| root.join(relative))
            .collect()
    }

    /// All files below `base` as sorted relative paths.
    fn walk_files(&self, base: &Path) -> Vec<PathBuf> {
        let ignored = Arc::clone(&self.ignored);
        let walker = WalkBuilder::new(base)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir && entry.file_name().to_str().is_some_and(|n| ignored.contains(n)))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::debug!(
                        target: "infinite_ls::glob",
                        "Skipping unreadable entry under {}: {}",
                        base.display(),
                        err
                    );
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(base) {
                files.push(relative.to_path_buf());
            }
        }
        files.sort();
        files
    }
}

fn has_glob_meta(component: &str) -> bool {
    component.contains(['*', '?', '[', ']', '{', '}'])
}

fn compile(pattern: &str) -> LspResult<CompiledPattern> {
    let normalized = pattern.strip_prefix("./").unwrap_or(pattern);

    let mut prefix = PathBuf::new();
    let mut rest: Vec<&str> = Vec::new();
    for component in Path::new(normalized).components() {
        match component {
            Component::Normal(part) if rest.is_empty() => {
                let Some(part) = part.to_str() else {
                    return Err(LspError::glob(pattern, "pattern is not valid UTF-8"));
                };
                if has_glob_meta(part) {
                    rest.push(part);
                } else {
                    prefix.push(part);
                }
            }
            Component::Normal(part) => match part.to_str() {
                Some(part) => rest.push(part),
                None => return Err(LspError::glob(pattern, "pattern is not valid UTF-8")),
            },
            Component::CurDir => {}
            Component::ParentDir if rest.is_empty() => prefix.push(".."),
            Component::ParentDir => rest.push(".."),
            Component::RootDir | Component::Prefix(_) => prefix.push(component.as_os_str()),
        }
    }

    if rest.is_empty() {
        return Ok(CompiledPattern {
            prefix,
            matcher: None,
        });
    }

    let matcher = GlobBuilder::new(&rest.join("/"))
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|err| LspError::glob(pattern, err.to_string()))?;
    Ok(CompiledPattern {
        prefix,
        matcher: Some(matcher),
    })
}
