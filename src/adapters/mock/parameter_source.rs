//! Scriptable in-memory parameter source.
//!
//! Serves pages out of memory, hands out continuation tokens `t1`, `t2`, ...
//! and records every request so tests can assert on pagination.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::RetrievalError;
use crate::paramstore::ParameterRecord;
use crate::traits::{PageRequest, ParameterPage, ParameterSource};

#[derive(Debug, Default)]
struct Script {
    /// Pages served for the current pass
    pages: Vec<Vec<ParameterRecord>>,
    /// Page sets swapped in, one per pass, whenever a pass starts
    queued_passes: VecDeque<Vec<Vec<ParameterRecord>>>,
    /// Failures keyed by 1-based overall call number
    failures_at: HashMap<usize, RetrievalError>,
    /// Failures consumed by the next calls, in order
    pending_failures: VecDeque<RetrievalError>,
    /// Token returned on every call when set
    stalled_token: Option<String>,
    requests: Vec<PageRequest>,
    latency: Option<Duration>,
}

/// In-memory [`ParameterSource`] for tests.
///
/// Cloning shares the script, so a test can keep a handle after moving a
/// clone into a provider.
///
/// # Example
///
/// ```
/// use paramstore::adapters::mock::MockParameterSource;
/// use paramstore::paramstore::ParameterRecord;
///
/// let source = MockParameterSource::new();
/// source.set_pages(vec![
///     vec![ParameterRecord::new("/app/a", "1", "arn:a", 1)],
///     vec![ParameterRecord::new("/app/b", "2", "arn:b", 1)],
/// ]);
/// assert_eq!(source.call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockParameterSource {
    script: Arc<Mutex<Script>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockParameterSource {
    /// Source with no parameters: every pass is one empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source serving `parameters` as a single page.
    pub fn with_parameters(parameters: Vec<ParameterRecord>) -> Self {
        let source = Self::new();
        source.set_pages(vec![parameters]);
        source
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the pages served from now on.
    pub fn set_pages(&self, pages: Vec<Vec<ParameterRecord>>) {
        self.script().pages = pages;
    }

    /// Serve `pages` starting with the next pass that begins.
    ///
    /// Several passes can be queued; each new pass takes the next one. Once
    /// the queue is empty the last swapped-in pages keep being served.
    pub fn enqueue_pass(&self, pages: Vec<Vec<ParameterRecord>>) {
        self.script().queued_passes.push_back(pages);
    }

    /// Fail the `call`-th request (1-based, counted over the source's lifetime).
    pub fn fail_call(&self, call: usize, error: RetrievalError) {
        self.script().failures_at.insert(call, error);
    }

    /// Fail the next request that arrives.
    pub fn push_failure(&self, error: RetrievalError) {
        self.script().pending_failures.push_back(error);
    }

    /// Return `token` as the continuation token on every call.
    pub fn set_stalled_token(&self, token: impl Into<String>) {
        self.script().stalled_token = Some(token.into());
    }

    /// Sleep this long inside every call.
    pub fn set_latency(&self, latency: Duration) {
        self.script().latency = Some(latency);
    }

    /// All requests received so far, failed ones included.
    pub fn get_requests(&self) -> Vec<PageRequest> {
        self.script().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script().requests.len()
    }

    /// Highest number of calls that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &PageRequest) -> Result<ParameterPage, RetrievalError> {
        let mut script = self.script();
        script.requests.push(request.clone());
        let call = script.requests.len();

        if let Some(error) = script.failures_at.remove(&call) {
            return Err(error);
        }
        if let Some(error) = script.pending_failures.pop_front() {
            return Err(error);
        }

        if request.next_token.is_none() {
            if let Some(pages) = script.queued_passes.pop_front() {
                script.pages = pages;
            }
        }

        if let Some(token) = script.stalled_token.clone() {
            return Ok(ParameterPage::new(Vec::new(), Some(token)));
        }

        let index = match request.next_token.as_deref() {
            None => 0,
            Some(token) => token
                .strip_prefix('t')
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| RetrievalError::InvalidResponse {
                    message: format!("unknown continuation token {:?}", token),
                })?,
        };

        let parameters = script.pages.get(index).cloned().unwrap_or_default();
        let next_token = if index + 1 < script.pages.len() {
            Some(format!("t{}", index + 1))
        } else {
            None
        };

        Ok(ParameterPage::new(parameters, next_token))
    }
}

#[async_trait]
impl ParameterSource for MockParameterSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ParameterPage, RetrievalError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let latency = self.script().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let result = self.respond(request);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
