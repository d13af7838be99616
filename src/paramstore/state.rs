//! Process-held store state: the last committed snapshot and the in-flight
//! pagination cursor.
//!
//! The provider keeps this behind a `tokio::sync::Mutex` that is held for a
//! whole pass, so a `read()` and a poll tick never interleave page calls or
//! commits.

use super::types::Snapshot;

/// Last-known snapshot plus the pagination cursor of the pass in progress.
#[derive(Debug, Default)]
pub struct StoreState {
    snapshot: Snapshot,
    cursor: Option<String>,
    commits: u64,
}

impl StoreState {
    /// Empty state: no baseline yet, no pass in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last committed snapshot (empty before the first successful pass).
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Continuation token of the pass in progress.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Number of snapshots committed so far.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Start a full pass from the first page.
    pub fn begin_pass(&mut self) {
        self.cursor = None;
    }

    /// Record the token to request next within the current pass.
    pub fn advance_cursor(&mut self, token: Option<String>) {
        self.cursor = token;
    }

    /// Drop the cursor; the next pass starts from the first page again.
    pub fn end_pass(&mut self) {
        self.cursor = None;
    }

    /// Replace the baseline wholesale and return the previous one.
    pub fn commit(&mut self, snapshot: Snapshot) -> Snapshot {
        self.commits += 1;
        std::mem::replace(&mut self.snapshot, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paramstore::types::ParameterRecord;

    #[test]
    fn test_new_state_is_empty() {
        let state = StoreState::new();
        assert!(state.snapshot().is_empty());
        assert!(state.cursor().is_none());
        assert_eq!(state.commits(), 0);
    }

    #[test]
    fn test_cursor_lifecycle() {
        let mut state = StoreState::new();

        state.begin_pass();
        state.advance_cursor(Some("t1".to_string()));
        assert_eq!(state.cursor(), Some("t1"));

        state.end_pass();
        assert!(state.cursor().is_none());

        state.advance_cursor(Some("stale".to_string()));
        state.begin_pass();
        assert!(state.cursor().is_none(), "a new pass must not resume mid-sequence");
    }

    #[test]
    fn test_commit_returns_previous() {
        let mut state = StoreState::new();
        let first = Snapshot::new(vec![ParameterRecord::new("/a", "1", "id-a", 1)], 1);

        let previous = state.commit(first);
        assert!(previous.is_empty());
        assert_eq!(state.snapshot().len(), 1);

        let previous = state.commit(Snapshot::new(Vec::new(), 1));
        assert_eq!(previous.len(), 1);
        assert!(state.snapshot().is_empty());
        assert_eq!(state.commits(), 2);
    }
}
