//! Parameter-store configuration provider.
//!
//! # Architecture
//!
//! ```text
//! read():   Fetcher ──► commit ──► Transform ──► unflatten ──► NestedConfig
//!              │
//!              ▼
//!         StoreState { snapshot, cursor }   (tokio Mutex, held per pass)
//!              ▲
//!              │
//! watch():  timer ──► Fetcher ──► commit ──► Detector ──► callback
//!                                       ▲      (only if something drifted)
//!                                       │
//!                              per-loop baseline
//! ```
//!
//! Every watch loop keeps its own baseline, seeded from the committed
//! snapshot when the loop starts, so two loops on one provider both see the
//! same drift.
//!
//! - [`fetcher`] runs one full paginated pass through a
//!   [`ParameterSource`](crate::traits::ParameterSource)
//! - [`detector`] reports records whose version moved since the last snapshot
//! - [`transform`] rewrites names into keys and nests them on the delimiter
//! - [`poller`] drives the watch loop
//! - [`provider`] ties it together as [`ParamStore`]

pub mod config;
pub mod detector;
pub mod fetcher;
pub mod poller;
pub mod provider;
pub mod state;
pub mod transform;
pub mod types;

pub use config::{ParamStoreConfig, DEFAULT_DELIMITER, DEFAULT_SIGNING_REGION, DEFAULT_WATCH_INTERVAL};
pub use detector::detect_changes;
pub use fetcher::fetch_snapshot;
pub use poller::WatchHandle;
pub use provider::ParamStore;
pub use state::StoreState;
pub use transform::{flatten, key_transform, materialize, strip_prefix, unflatten, KeyTransform, NestedConfig};
pub use types::{ChangeEvent, ParameterRecord, Snapshot, WatchNotification};
