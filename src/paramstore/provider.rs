//! `ParamStore`: the provider callers construct.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

use super::config::ParamStoreConfig;
use super::fetcher::fetch_snapshot;
use super::poller::{spawn_poller, PollerContext, WatchHandle};
use super::state::StoreState;
use super::transform::{materialize, KeyTransform, NestedConfig};
use super::types::{Snapshot, WatchNotification};
use crate::adapters::{
    AssumeRoleProvider, HttpParameterSource, ReqwestHttpClient, RequestSigner, StaticCredentialsProvider,
};
use crate::error::{ConfigurationError, ParamResult};
use crate::traits::{Capability, ConfigProvider, CredentialsProvider, ParameterSource, WatchCallback};

/// Parameter-store configuration provider.
///
/// Reads every parameter under a path into a nested mapping, and can poll
/// the path in the background to report version drift.
///
/// All reads and poll ticks of one provider share a single store state, so
/// passes never interleave. Each watch loop diffs against its own baseline,
/// seeded from the committed snapshot when the loop is started.
///
/// # Example
///
/// ```no_run
/// use paramstore::paramstore::{strip_prefix, ParamStore, ParamStoreConfig, WatchNotification};
/// use paramstore::traits::ConfigProvider;
/// use std::sync::Arc;
///
/// # async fn run() -> paramstore::error::ParamResult<()> {
/// let config = ParamStoreConfig::new()
///     .with_path("/app/prod/")
///     .with_region("eu-west-1")
///     .with_credentials("AKIDEXAMPLE", "secret");
/// let store = ParamStore::new(config, Some(strip_prefix("/app/prod/")))?;
///
/// let settings = store.read().await?;
/// println!("{}", serde_json::Value::Object(settings));
///
/// let handle = store.watch(Arc::new(|notification: WatchNotification| match notification {
///     Ok(event) => println!("changed: {:?}", event.names()),
///     Err(e) => eprintln!("poll failed: {}", e),
/// }))?;
/// # handle.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct ParamStore {
    ctx: PollerContext,
    transform: Option<KeyTransform>,
    shutdown_tx: watch::Sender<bool>,
}

impl ParamStore {
    /// Provider backed by the HTTP adapter.
    ///
    /// Requests are SigV4-signed with the configured static keys, or with a
    /// session for `role_arn` assumed through STS using those keys. With an
    /// explicit endpoint and no keys, requests go out unsigned (emulators,
    /// signing proxies).
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::MissingEndpoint` if neither a region nor an
    ///   endpoint is configured
    /// - `ConfigurationError::MissingCredentials` if the regional endpoint or
    ///   a role is used without a static key pair
    ///
    /// The path is checked later, by `read`/`watch`.
    pub fn new(config: ParamStoreConfig, transform: Option<KeyTransform>) -> ParamResult<Self> {
        let endpoint = config
            .resolved_endpoint()
            .ok_or(ConfigurationError::MissingEndpoint)?;
        let client = ReqwestHttpClient::new();

        let mut source = HttpParameterSource::new(client.clone(), endpoint);
        if let Some(credentials) = credentials_for(&config, &client)? {
            let signer = RequestSigner::new(config.signing_region(), "ssm");
            source = source.with_signing(signer, credentials);
        }
        Ok(Self::with_source(config, transform, Arc::new(source)))
    }

    /// Provider over an injected parameter source.
    pub fn with_source(
        config: ParamStoreConfig,
        transform: Option<KeyTransform>,
        source: Arc<dyn ParameterSource>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            ctx: PollerContext {
                source,
                config: Arc::new(config.normalized()),
                state: Arc::new(Mutex::new(StoreState::new())),
            },
            transform,
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &ParamStoreConfig {
        &self.ctx.config
    }

    /// Copy of the last committed snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        self.ctx.state.lock().await.snapshot().clone()
    }

    /// Fetch everything under the path, seed the baseline, build the mapping.
    ///
    /// The snapshot is committed before keys are transformed, so a later
    /// watch diffs against it even if this call fails with `EmptyKey`.
    pub async fn read(&self) -> ParamResult<NestedConfig> {
        let records = {
            let mut state = self.ctx.state.lock().await;
            let snapshot = fetch_snapshot(self.ctx.source.as_ref(), &self.ctx.config, &mut state).await?;
            let records = snapshot.records().to_vec();
            state.commit(snapshot);
            records
        };

        tracing::info!(
            "Read {} parameters under {}",
            records.len(),
            self.ctx.config.path
        );
        materialize(&records, self.transform.as_ref(), &self.ctx.config.delimiter)
    }

    /// Start a background poll loop; `callback` gets every non-empty change
    /// set and every failed tick.
    ///
    /// Returns immediately. Every call starts its own loop with its own
    /// baseline, seeded from the snapshot committed at this point (or, if a
    /// pass is in flight, from the one it commits).
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::MissingPath` when no path is configured
    /// - `ConfigurationError::NoRuntime` outside a tokio runtime
    pub fn watch(&self, callback: WatchCallback) -> ParamResult<WatchHandle> {
        self.ctx.config.require_path()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConfigurationError::NoRuntime)?;

        let baseline = self
            .ctx
            .state
            .try_lock()
            .ok()
            .map(|state| state.snapshot().clone());

        Ok(spawn_poller(
            &runtime,
            self.ctx.clone(),
            baseline,
            callback,
            self.shutdown_tx.subscribe(),
        ))
    }

    /// [`watch`](Self::watch) delivering into a channel instead of a callback.
    ///
    /// The loop keeps running if the receiver is dropped; stop it through the
    /// handle.
    pub fn subscribe(&self) -> ParamResult<(WatchHandle, mpsc::UnboundedReceiver<WatchNotification>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = self.watch(Arc::new(move |notification: WatchNotification| {
            if tx.send(notification).is_err() {
                tracing::trace!("Subscriber gone, dropping notification");
            }
        }))?;
        Ok((handle, rx))
    }

    /// Stop every watch loop started from this provider.
    ///
    /// Final: loops started afterwards exit before their first tick.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        tracing::debug!("Shutdown signalled for {}", self.ctx.config.path);
    }
}

/// Signing credentials for the HTTP adapter, or `None` for unsigned requests.
fn credentials_for(
    config: &ParamStoreConfig,
    client: &ReqwestHttpClient,
) -> Result<Option<Arc<dyn CredentialsProvider>>, ConfigurationError> {
    let base: Option<Arc<dyn CredentialsProvider>> = config
        .static_credentials()
        .map(|creds| Arc::new(StaticCredentialsProvider::new(creds)) as Arc<dyn CredentialsProvider>);

    match (base, config.role_arn.as_deref()) {
        (Some(base), Some(role_arn)) => {
            tracing::debug!("Requests will be signed as role {}", role_arn);
            let provider = AssumeRoleProvider::new(
                client.clone(),
                base,
                role_arn,
                config.resolved_sts_endpoint(),
                config.signing_region(),
            );
            Ok(Some(Arc::new(provider)))
        }
        (Some(base), None) => Ok(Some(base)),
        (None, Some(_)) => Err(ConfigurationError::MissingCredentials),
        (None, None) if config.endpoint.is_none() => Err(ConfigurationError::MissingCredentials),
        (None, None) => Ok(None),
    }
}

#[async_trait]
impl ConfigProvider for ParamStore {
    fn kind(&self) -> &'static str {
        "paramstore"
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::Read | Capability::Watch)
    }

    async fn read(&self) -> ParamResult<NestedConfig> {
        ParamStore::read(self).await
    }

    fn watch(&self, callback: WatchCallback) -> ParamResult<WatchHandle> {
        ParamStore::watch(self, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockParameterSource;
    use crate::error::RetrievalError;
    use crate::paramstore::transform::strip_prefix;
    use crate::paramstore::types::ParameterRecord;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn rec(name: &str, value: &str, version: i64) -> ParameterRecord {
        ParameterRecord::new(name, value, format!("arn:{}", name), version)
    }

    fn store(source: &MockParameterSource, path: &str) -> ParamStore {
        ParamStore::with_source(
            ParamStoreConfig::new().with_path(path),
            Some(strip_prefix(format!("{}/", path))),
            Arc::new(source.clone()),
        )
    }

    #[test]
    fn test_new_requires_region_or_endpoint() {
        let err = ParamStore::new(ParamStoreConfig::new().with_path("/app"), None)
            .err()
            .unwrap();
        assert!(err.is_configuration());

        assert!(ParamStore::new(
            ParamStoreConfig::new()
                .with_region("us-east-1")
                .with_credentials("AKID", "secret"),
            None
        )
        .is_ok());
    }

    #[test]
    fn test_regional_endpoint_requires_credentials() {
        let err = ParamStore::new(ParamStoreConfig::new().with_region("us-east-1"), None)
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "CONFIG_MISSING_CREDENTIALS");

        let role_without_keys = ParamStoreConfig::new()
            .with_endpoint("http://localhost:4566")
            .with_role_arn("arn:aws:iam::1:role/reader");
        assert!(ParamStore::new(role_without_keys, None).is_err());
    }

    #[test]
    fn test_credentials_selection() {
        let client = ReqwestHttpClient::new();

        let emulator = ParamStoreConfig::new().with_endpoint("http://localhost:4566");
        assert!(credentials_for(&emulator, &client).unwrap().is_none());

        let signed = emulator.clone().with_credentials("AKID", "secret");
        assert!(credentials_for(&signed, &client).unwrap().is_some());

        let role = signed.with_role_arn("arn:aws:iam::1:role/reader");
        assert!(credentials_for(&role, &client).unwrap().is_some());
    }

    #[test]
    fn test_capabilities() {
        let store = store(&MockParameterSource::new(), "/app");
        assert_eq!(store.kind(), "paramstore");
        assert!(store.supports(Capability::Read));
        assert!(store.supports(Capability::Watch));
        assert!(!store.supports(Capability::ReadBytes));
    }

    #[test]
    fn test_config_is_normalized() {
        let store = ParamStore::with_source(
            ParamStoreConfig::new()
                .with_path("/app")
                .with_delimiter("")
                .with_watch_interval(Duration::ZERO),
            None,
            Arc::new(MockParameterSource::new()),
        );
        assert_eq!(store.config().delimiter, "/");
        assert_eq!(store.config().watch_interval, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_read_builds_nested_mapping() {
        let source = MockParameterSource::with_parameters(vec![
            rec("/app/db/host", "localhost", 1),
            rec("/app/db/port", "5432", 1),
        ]);
        let store = store(&source, "/app");

        let config = store.read().await.unwrap();

        assert_eq!(
            Value::Object(config),
            json!({ "db": { "host": "localhost", "port": "5432" } })
        );
        assert_eq!(store.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_read_empty_key_still_seeds_baseline() {
        let source = MockParameterSource::with_parameters(vec![rec("/app/", "root", 1)]);
        let store = store(&source, "/app");

        let err = store.read().await.unwrap_err();

        assert!(err.is_empty_key());
        assert_eq!(store.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_keeps_previous_baseline() {
        let source = MockParameterSource::with_parameters(vec![rec("/app/a", "1", 1)]);
        let store = store(&source, "/app");
        store.read().await.unwrap();

        source.push_failure(RetrievalError::other("down"));
        assert!(store.read().await.unwrap_err().is_retrieval());

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.records(), &[rec("/app/a", "1", 1)]);
    }

    #[tokio::test]
    async fn test_read_bytes_unsupported() {
        let store = store(&MockParameterSource::new(), "/app");
        let err = store.read_bytes().await.unwrap_err();
        assert!(err.is_unsupported());
    }

    #[tokio::test]
    async fn test_watch_requires_path() {
        let store = ParamStore::with_source(
            ParamStoreConfig::new(),
            None,
            Arc::new(MockParameterSource::new()),
        );
        let err = store.watch(Arc::new(|_: WatchNotification| {})).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_watch_outside_runtime_fails() {
        let store = store(&MockParameterSource::new(), "/app");
        let err = store.watch(Arc::new(|_: WatchNotification| {})).err().unwrap();
        assert!(matches!(
            err,
            crate::error::ParamStoreError::Configuration(ConfigurationError::NoRuntime)
        ));
    }
}
