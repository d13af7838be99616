//! Change detector: version drift between two snapshots.
//!
//! A record counts as changed only if its identity already appeared in the
//! previous snapshot with a different version. New identities and vanished
//! identities are not reported; polling detects drift, not membership.

use std::collections::HashMap;

use super::types::{ParameterRecord, Snapshot};

/// Records of `current` whose identity is in `previous` with another version.
///
/// Output follows the order of `current`. Identities are compared as exact
/// strings. If `previous` holds the same identity more than once, the first
/// occurrence is the one compared against.
pub fn detect_changes(previous: &Snapshot, current: &Snapshot) -> Vec<ParameterRecord> {
    diff_records(previous.records(), current.records())
}

/// Slice form of [`detect_changes`].
pub fn diff_records(previous: &[ParameterRecord], current: &[ParameterRecord]) -> Vec<ParameterRecord> {
    if previous.is_empty() {
        return Vec::new();
    }

    let mut known: HashMap<&str, i64> = HashMap::with_capacity(previous.len());
    for record in previous {
        known.entry(record.identity.as_str()).or_insert(record.version);
    }

    current
        .iter()
        .filter(|record| {
            known
                .get(record.identity.as_str())
                .is_some_and(|version| *version != record.version)
        })
        .cloned()
        .collect()
}
