use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Store mapping absolute paths to values with longest-prefix lookup.
///
/// Keys are compared component-wise, so `/a/b` is a prefix of `/a/b/c` but
/// not of `/a/bc`. Among several matching keys the longest one wins; keys of
/// equal length are resolved in favour of the lexicographically smallest.
#[derive(Debug, Clone)]
pub struct PrefixRegistry<T> {
    entries: BTreeMap<PathBuf, T>,
}

impl<T> Default for PrefixRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PrefixRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the value at `key`, returning the previous value
    pub fn set(&mut self, key: impl Into<PathBuf>, value: T) -> Option<T> {
        self.entries.insert(key.into(), value)
    }

    /// Exact lookup
    pub fn get(&self, key: &Path) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn delete(&mut self, key: &Path) -> Option<T> {
        self.entries.remove(key)
    }

    /// Find the entry whose key is the longest prefix of `path`
    pub fn search(&self, path: &Path) -> Option<(&Path, &T)> {
        let mut best: Option<(&Path, &T)> = None;
        for (key, value) in &self.entries {
            if !path.starts_with(key) {
                continue;
            }
            let longer = best
                .map(|(best_key, _)| key.as_os_str().len() > best_key.as_os_str().len())
                .unwrap_or(true);
            if longer {
                best = Some((key.as_path(), value));
            }
        }
        best
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_path(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
