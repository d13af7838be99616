//! Paramstore - configuration provider backed by a hierarchical parameter store
//!
//! Reads every parameter under a path into a nested mapping and polls the
//! path in the background to report parameters whose version changed.
//!
//! This library exposes modules for use in integration tests and by the
//! `paramstore` binary.

pub mod adapters;
pub mod cli;
pub mod error;
pub mod paramstore;
pub mod traits;

pub use error::{ParamResult, ParamStoreError};
pub use paramstore::{ChangeEvent, ParamStore, ParamStoreConfig, ParameterRecord, WatchHandle};
pub use traits::{Capability, ConfigProvider};
