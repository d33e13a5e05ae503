//! Sequencing of diagnostic runs.
//!
//! Every document change starts a new run for its URI. A run may only
//! publish while it is still the latest one for that URI, so diagnostics
//! computed for stale text never overwrite newer results.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Tracks the latest diagnostic run per document
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSequencer {
    latest: Arc<DashMap<Url, u64>>,
    next: Arc<AtomicU64>,
}

impl DiagnosticSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run for `uri`, superseding any earlier run.
    pub fn begin(&self, uri: &Url) -> u64 {
        let sequence = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.insert(uri.clone(), sequence);
        sequence
    }

    /// Whether `sequence` is still the latest run for `uri`.
    pub fn is_latest(&self, uri: &Url, sequence: u64) -> bool {
        self.latest
            .get(uri)
            .is_some_and(|latest| *latest == sequence)
    }

    /// Forget `uri`; in-flight runs for it will not publish.
    pub fn forget(&self, uri: &Url) {
        self.latest.remove(uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_run_supersedes_older() {
        let sequencer = DiagnosticSequencer::new();
        let uri = Url::parse("file:///proj/doc.txt").unwrap();

        let first = sequencer.begin(&uri);
        let second = sequencer.begin(&uri);

        assert!(second > first);
        assert!(!sequencer.is_latest(&uri, first));
        assert!(sequencer.is_latest(&uri, second));
    }

    #[test]
    fn test_runs_are_per_uri() {
        let sequencer = DiagnosticSequencer::new();
        let a = Url::parse("file:///proj/a.txt").unwrap();
        let b = Url::parse("file:///proj/b.txt").unwrap();

        let run_a = sequencer.begin(&a);
        let run_b = sequencer.begin(&b);

        assert!(sequencer.is_latest(&a, run_a));
        assert!(sequencer.is_latest(&b, run_b));
    }

    #[test]
    fn test_forget_blocks_in_flight_run() {
        let sequencer = DiagnosticSequencer::new();
        let uri = Url::parse("file:///proj/doc.txt").unwrap();

        let run = sequencer.begin(&uri);
        sequencer.forget(&uri);

        assert!(!sequencer.is_latest(&uri, run));
    }

    #[test]
    fn test_clones_share_state() {
        let sequencer = DiagnosticSequencer::new();
        let clone = sequencer.clone();
        let uri = Url::parse("file:///proj/doc.txt").unwrap();

        let run = sequencer.begin(&uri);
        assert!(clone.is_latest(&uri, run));
    }
}
