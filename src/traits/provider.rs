//! Configuration provider capability interface.
//!
//! Providers differ in what they can do: some only produce raw bytes for a
//! parser, some produce an already-structured mapping, some can push change
//! notifications. Each capability is one method; `supports` tells callers
//! which ones are real before they try.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

use crate::error::{ParamResult, ParamStoreError};
use crate::paramstore::{NestedConfig, WatchHandle, WatchNotification};

/// Something a provider may or may not be able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Produce a nested configuration mapping
    Read,
    /// Produce raw bytes for an external parser
    ReadBytes,
    /// Deliver change notifications in the background
    Watch,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::ReadBytes => "read_bytes",
            Capability::Watch => "watch",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Callback invoked by a watch loop.
pub type WatchCallback = Arc<dyn Fn(WatchNotification) + Send + Sync>;

/// A source of configuration.
///
/// Unsupported capabilities fail with `ParamStoreError::UnsupportedOperation`.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Short provider name used in errors and logs.
    fn kind(&self) -> &'static str;

    /// Whether the capability is implemented.
    fn supports(&self, capability: Capability) -> bool;

    /// One-shot read of the full configuration.
    async fn read(&self) -> ParamResult<NestedConfig>;

    /// Raw bytes for an external parser.
    async fn read_bytes(&self) -> ParamResult<Bytes> {
        Err(ParamStoreError::UnsupportedOperation {
            provider: self.kind(),
            operation: Capability::ReadBytes.as_str(),
        })
    }

    /// Start delivering change notifications; returns immediately.
    fn watch(&self, callback: WatchCallback) -> ParamResult<WatchHandle>;
}
