//! Paginated parameter retrieval abstraction.
//!
//! This is the only thing the provider needs from a parameter store: list
//! the parameters under a path, one page at a time.

use async_trait::async_trait;

use crate::error::RetrievalError;
use crate::paramstore::ParameterRecord;

/// Input for one page call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Path prefix to list under
    pub path: String,
    /// Ask the store to decrypt secure values
    pub with_decryption: bool,
    /// Include parameters in nested paths
    pub recursive: bool,
    /// Page size hint; `None` lets the store decide
    pub max_results: Option<u32>,
    /// Continuation token from the previous page; `None` starts a pass
    pub next_token: Option<String>,
}

impl PageRequest {
    /// First-page request for a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            with_decryption: false,
            recursive: false,
            max_results: None,
            next_token: None,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub parameters: Vec<ParameterRecord>,
    /// `None` when this was the last page
    pub next_token: Option<String>,
}

impl ParameterPage {
    pub fn new(parameters: Vec<ParameterRecord>, next_token: Option<String>) -> Self {
        Self {
            parameters,
            next_token,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

/// Trait for listing parameters under a path.
///
/// Implementations must be thread-safe (Send + Sync) to work with the
/// background poller. Retry policy belongs to the implementation; the
/// provider never retries a failed page.
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Fetch one page of parameters.
    async fn fetch_page(&self, request: &PageRequest) -> Result<ParameterPage, RetrievalError>;
}
