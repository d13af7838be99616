//! Common test utilities for integration tests.
//!
//! Fixtures for parameter records and snapshots, plus a provider wired to a
//! shared [`MockParameterSource`](paramstore::adapters::MockParameterSource).
//!
//! # Example
//!
//! ```ignore
//! use common::{record, test_store};
//!
//! let (store, source) = test_store("/app", Duration::from_secs(10));
//! source.set_pages(vec![vec![record("a", 1)]]);
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use paramstore::paramstore::{
    strip_prefix, ParamStore, ParamStoreConfig, ParameterRecord, Snapshot, WatchNotification,
};
use paramstore::traits::WatchCallback;

/// Record `/app/<id>` with identity `arn:<id>` at `version`.
pub fn record(id: &str, version: i64) -> ParameterRecord {
    ParameterRecord::new(
        format!("/app/{}", id),
        format!("{}-v{}", id, version),
        format!("arn:{}", id),
        version,
    )
}

/// Record with an explicit name and value.
pub fn named(name: &str, value: &str) -> ParameterRecord {
    ParameterRecord::new(name, value, format!("arn:{}", name), 1)
}

/// Single-page snapshot of `records`.
pub fn snapshot(records: Vec<ParameterRecord>) -> Snapshot {
    Snapshot::new(records, 1)
}

/// Provider over a fresh mock source, stripping `<path>/` from keys.
pub fn test_store(path: &str, interval: Duration) -> (ParamStore, MockParameterSource) {
    let source = MockParameterSource::new();
    let config = ParamStoreConfig::new()
        .with_path(path)
        .with_watch_interval(interval);
    let store = ParamStore::with_source(
        config,
        Some(strip_prefix(format!("{}/", path))),
        Arc::new(source.clone()),
    );
    (store, source)
}

/// Callback that stores every notification it receives.
pub fn recording_callback() -> (WatchCallback, Arc<Mutex<Vec<WatchNotification>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: WatchCallback = Arc::new(move |notification: WatchNotification| {
        sink.lock().unwrap().push(notification);
    });
    (callback, seen)
}
