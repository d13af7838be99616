//! Shared types for parameter retrieval and change detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParamResult;

/// One parameter as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    /// Hierarchical name, delimiter-separated (e.g. `/app/db/host`)
    pub name: String,
    /// Raw value (already decrypted if decryption was requested)
    pub value: String,
    /// Identifier that stays the same across versions of this parameter
    pub identity: String,
    /// Bumped by the store on every write
    pub version: i64,
}

impl ParameterRecord {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        identity: impl Into<String>,
        version: i64,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            identity: identity.into(),
            version,
        }
    }
}

/// All parameters under a path, collected in one full pagination pass.
///
/// Pages are fetched sequentially, so a write landing mid-pass may or may not
/// be visible. Records keep the order the store returned them in.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<ParameterRecord>,
    pages: u32,
    fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Create a snapshot from records fetched over `pages` calls.
    pub fn new(records: Vec<ParameterRecord>, pages: u32) -> Self {
        Self {
            records,
            pages,
            fetched_at: Some(Utc::now()),
        }
    }

    /// The empty baseline held before the first successful pass.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ParameterRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ParameterRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of page calls the pass took (0 for the empty baseline).
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// When the pass completed; `None` for the empty baseline.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// First record with the given identity.
    pub fn find_by_identity(&self, identity: &str) -> Option<&ParameterRecord> {
        self.records.iter().find(|r| r.identity == identity)
    }
}

/// Parameters whose identity was already known but whose version moved.
///
/// Never empty: construct it through [`ChangeEvent::from_changes`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// Changed records as they appear in the new snapshot, in snapshot order
    pub parameters: Vec<ParameterRecord>,
    /// When the change was detected
    pub detected_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Wrap a detector result; returns `None` when nothing changed.
    pub fn from_changes(parameters: Vec<ParameterRecord>) -> Option<Self> {
        if parameters.is_empty() {
            return None;
        }
        Some(Self {
            parameters,
            detected_at: Utc::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Names of the changed parameters.
    pub fn names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        self.parameters.iter().any(|p| p.identity == identity)
    }
}

/// What a watch delivers per tick: a change set, or the error that aborted the tick.
pub type WatchNotification = ParamResult<ChangeEvent>;
