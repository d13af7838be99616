//! Mock credentials provider for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::RetrievalError;
use crate::traits::{Credentials, CredentialsProvider};

/// Hands out fixed credentials, or queued failures first.
///
/// Clones share the failure queue and the call counter.
#[derive(Debug, Clone)]
pub struct MockCredentialsProvider {
    credentials: Credentials,
    failures: Arc<Mutex<VecDeque<RetrievalError>>>,
    calls: Arc<AtomicUsize>,
}

impl MockCredentialsProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            failures: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the next call with `error`.
    pub fn push_failure(&self, error: RetrievalError) {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(error);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialsProvider for MockCredentialsProvider {
    async fn credentials(&self) -> Result<Credentials, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        match failure {
            Some(err) => Err(err),
            None => Ok(self.credentials.clone()),
        }
    }
}
