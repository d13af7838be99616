//! Snapshot fetcher: one full paginated pass over a parameter path.
//!
//! Used both by `read()` and by every poll tick. A pass either completes and
//! yields a [`Snapshot`], or fails as a whole: partial pages are discarded
//! and nothing is committed. No retries happen here.

use std::collections::HashSet;

use tracing::debug;

use super::config::ParamStoreConfig;
use super::state::StoreState;
use super::types::Snapshot;
use crate::error::{ErrorContext, ParamResult, ParamStoreError, ResultExt, RetrievalError};
use crate::traits::{PageRequest, ParameterSource};

/// Fetch every parameter under `config.path`, following continuation tokens.
///
/// The cursor in `state` is reset before the first page and cleared when the
/// pass ends, whether it succeeded or not. The returned snapshot is *not*
/// committed; that is the caller's decision.
///
/// # Errors
///
/// - `ConfigurationError::MissingPath` if the path is empty, before any call
///   to `source`
/// - `RetrievalError` (with page context) if any page call fails, or if the
///   source hands back a continuation token already seen in this pass
pub async fn fetch_snapshot(
    source: &dyn ParameterSource,
    config: &ParamStoreConfig,
    state: &mut StoreState,
) -> ParamResult<Snapshot> {
    let path = config.require_path()?.to_string();

    state.begin_pass();
    let result = run_pass(source, config, &path, state).await;
    state.end_pass();

    if let Ok(ref snapshot) = result {
        debug!(
            "Fetched {} parameters under {} in {} page(s)",
            snapshot.len(),
            path,
            snapshot.pages()
        );
    }
    result
}

async fn run_pass(
    source: &dyn ParameterSource,
    config: &ParamStoreConfig,
    path: &str,
    state: &mut StoreState,
) -> ParamResult<Snapshot> {
    let mut records = Vec::new();
    let mut page_no: u32 = 0;
    let mut seen_tokens: HashSet<String> = HashSet::new();

    loop {
        page_no += 1;
        let request = PageRequest {
            path: path.to_string(),
            with_decryption: config.with_decryption,
            recursive: config.recursive,
            max_results: config.page_size,
            next_token: state.cursor().map(str::to_string),
        };

        let page = source
            .fetch_page(&request)
            .await
            .with_context(|| page_context(path, page_no))?;

        // An empty token means the same as no token.
        let next_token = page.next_token.filter(|token| !token.is_empty());

        if let Some(next) = &next_token {
            if !seen_tokens.insert(next.clone()) {
                let err = ParamStoreError::from(RetrievalError::StalledPagination {
                    token: next.clone(),
                });
                return Err(err.with_context(page_context(path, page_no)));
            }
        }

        debug!(
            "Page {} under {}: {} parameters, more: {}",
            page_no,
            path,
            page.parameters.len(),
            next_token.is_some()
        );

        records.extend(page.parameters);
        state.advance_cursor(next_token);

        if state.cursor().is_none() {
            break;
        }
    }

    Ok(Snapshot::new(records, page_no))
}

fn page_context(path: &str, page_no: u32) -> ErrorContext {
    ErrorContext::new("fetch_snapshot")
        .with_path(path)
        .with_page(page_no)
        .with_component("fetcher")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockParameterSource;
    use crate::paramstore::types::ParameterRecord;

    fn record(name: &str, version: i64) -> ParameterRecord {
        ParameterRecord::new(name, "value", format!("arn:{}", name), version)
    }

    fn config() -> ParamStoreConfig {
        ParamStoreConfig::new().with_path("/app")
    }

    #[tokio::test]
    async fn test_empty_path_fails_before_any_call() {
        let source = MockParameterSource::new();
        let mut state = StoreState::new();

        let err = fetch_snapshot(&source, &ParamStoreConfig::new(), &mut state)
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_follows_tokens_until_exhausted() {
        let source = MockParameterSource::new();
        source.set_pages(vec![
            vec![record("/app/a", 1), record("/app/b", 1)],
            vec![record("/app/c", 1), record("/app/d", 1)],
            vec![record("/app/e", 1)],
        ]);
        let mut state = StoreState::new();

        let snapshot = fetch_snapshot(&source, &config(), &mut state).await.unwrap();

        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.pages(), 3);
        assert_eq!(snapshot.records()[4].name, "/app/e");

        let tokens: Vec<Option<String>> = source
            .get_requests()
            .into_iter()
            .map(|r| r.next_token)
            .collect();
        assert_eq!(
            tokens,
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
        assert!(state.cursor().is_none());
        assert_eq!(state.commits(), 0, "fetching must not commit");
    }

    #[tokio::test]
    async fn test_request_carries_config_flags() {
        let source = MockParameterSource::with_parameters(vec![record("/app/a", 1)]);
        let mut state = StoreState::new();
        let config = config()
            .with_decryption(true)
            .with_recursive(true)
            .with_page_size(10);

        fetch_snapshot(&source, &config, &mut state).await.unwrap();

        let request = &source.get_requests()[0];
        assert_eq!(request.path, "/app");
        assert!(request.with_decryption);
        assert!(request.recursive);
        assert_eq!(request.max_results, Some(10));
    }

    #[tokio::test]
    async fn test_page_failure_abandons_pass() {
        let source = MockParameterSource::new();
        source.set_pages(vec![vec![record("/app/a", 1)], vec![record("/app/b", 1)]]);
        source.fail_call(2, RetrievalError::other("page two broke"));
        let mut state = StoreState::new();

        let err = fetch_snapshot(&source, &config(), &mut state).await.unwrap_err();

        assert!(err.is_retrieval());
        assert_eq!(err.context().and_then(|c| c.page), Some(2));
        assert!(state.cursor().is_none(), "cursor must not leak into the next pass");

        // The next pass starts over from the first page.
        fetch_snapshot(&source, &config(), &mut state).await.unwrap();
        let requests = source.get_requests();
        assert_eq!(requests[2].next_token, None);
    }

    #[tokio::test]
    async fn test_stalled_token_is_an_error() {
        let source = MockParameterSource::new();
        source.set_stalled_token("loop");
        let mut state = StoreState::new();

        let err = fetch_snapshot(&source, &config(), &mut state).await.unwrap_err();

        assert!(matches!(
            err.as_retrieval(),
            Some(RetrievalError::StalledPagination { token }) if token == "loop"
        ));
        assert_eq!(source.call_count(), 2);
    }

    /// Serves tokens in a cycle: none -> t1 -> t2 -> t1 -> ...
    struct CyclingSource;

    #[async_trait::async_trait]
    impl ParameterSource for CyclingSource {
        async fn fetch_page(
            &self,
            request: &PageRequest,
        ) -> Result<crate::traits::ParameterPage, RetrievalError> {
            let next = match request.next_token.as_deref() {
                Some("t1") => "t2",
                _ => "t1",
            };
            Ok(crate::traits::ParameterPage::new(
                vec![record("/app/a", 1)],
                Some(next.to_string()),
            ))
        }
    }

    #[tokio::test]
    async fn test_token_cycle_is_an_error() {
        let mut state = StoreState::new();

        let err = fetch_snapshot(&CyclingSource, &config(), &mut state)
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_retrieval(),
            Some(RetrievalError::StalledPagination { token }) if token == "t1"
        ));
        assert_eq!(err.context().and_then(|c| c.page), Some(3));
        assert!(state.cursor().is_none());
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_snapshot() {
        let source = MockParameterSource::new();
        let mut state = StoreState::new();

        let snapshot = fetch_snapshot(&source, &config(), &mut state).await.unwrap();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.pages(), 1);
    }
}
