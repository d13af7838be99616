//! Provider configuration.

use std::time::Duration;

use crate::error::ConfigurationError;
use crate::traits::Credentials;

/// Delimiter used when none is configured.
pub const DEFAULT_DELIMITER: &str = "/";

/// Poll interval used when none (or zero) is configured: 10 minutes.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(600);

/// Region requests are signed for when only an endpoint override is set.
pub const DEFAULT_SIGNING_REGION: &str = "us-east-1";

/// Configuration for a parameter-store provider.
///
/// Use the builder methods; defaults are filled in by [`normalized`](Self::normalized),
/// which every provider constructor calls.
///
/// # Example
///
/// ```
/// use paramstore::paramstore::ParamStoreConfig;
/// use std::time::Duration;
///
/// let config = ParamStoreConfig::new()
///     .with_path("/app/prod")
///     .with_decryption(true)
///     .with_watch_interval(Duration::from_secs(60));
/// assert_eq!(config.delimiter, "/");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ParamStoreConfig {
    /// Path prefix to read under (required for read/watch)
    pub path: String,
    /// Separator for nesting keys (default: "/")
    pub delimiter: String,
    /// Decrypt secure values
    pub with_decryption: bool,
    /// Include parameters in nested paths
    pub recursive: bool,
    /// Interval between poll ticks (default: 600s)
    pub watch_interval: Duration,
    /// Page size hint passed to the store
    pub page_size: Option<u32>,
    /// Region used to derive the store endpoint
    pub region: Option<String>,
    /// Explicit endpoint (emulator, proxy); wins over `region`
    pub endpoint: Option<String>,
    /// Static access key id; used together with `secret_access_key`
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Session token for temporary static keys
    pub session_token: Option<String>,
    /// Role assumed through STS with the static keys
    pub role_arn: Option<String>,
    /// STS endpoint override for role assumption
    pub sts_endpoint: Option<String>,
}

impl std::fmt::Debug for ParamStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("ParamStoreConfig")
            .field("path", &self.path)
            .field("delimiter", &self.delimiter)
            .field("with_decryption", &self.with_decryption)
            .field("recursive", &self.recursive)
            .field("watch_interval", &self.watch_interval)
            .field("page_size", &self.page_size)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redacted(&self.secret_access_key))
            .field("session_token", &redacted(&self.session_token))
            .field("role_arn", &self.role_arn)
            .field("sts_endpoint", &self.sts_endpoint)
            .finish()
    }
}

impl Default for ParamStoreConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            with_decryption: false,
            recursive: false,
            watch_interval: DEFAULT_WATCH_INTERVAL,
            page_size: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            role_arn: None,
            sts_endpoint: None,
        }
    }
}

impl ParamStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_decryption(mut self, decrypt: bool) -> Self {
        self.with_decryption = decrypt;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Static key pair used to sign requests.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Assume `role_arn` with the static keys before talking to the store.
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    pub fn with_sts_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sts_endpoint = Some(endpoint.into());
        self
    }

    /// Fill in defaults for empty delimiter and zero interval.
    pub fn normalized(mut self) -> Self {
        if self.delimiter.is_empty() {
            self.delimiter = DEFAULT_DELIMITER.to_string();
        }
        if self.watch_interval.is_zero() {
            self.watch_interval = DEFAULT_WATCH_INTERVAL;
        }
        self
    }

    /// Fail with `MissingPath` when no path is set.
    pub fn require_path(&self) -> Result<&str, ConfigurationError> {
        if self.path.is_empty() {
            Err(ConfigurationError::MissingPath)
        } else {
            Ok(&self.path)
        }
    }

    /// Endpoint URL for the store, if one can be derived.
    pub fn resolved_endpoint(&self) -> Option<String> {
        self.endpoint.clone().or_else(|| {
            self.region
                .as_ref()
                .map(|region| format!("https://ssm.{}.amazonaws.com/", region))
        })
    }

    /// Region requests are signed for.
    pub fn signing_region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_SIGNING_REGION)
    }

    /// STS endpoint for role assumption: the override, else the regional one.
    pub fn resolved_sts_endpoint(&self) -> String {
        self.sts_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://sts.{}.amazonaws.com/", self.signing_region()))
    }

    /// The static key pair, when both halves are set and non-empty.
    pub fn static_credentials(&self) -> Option<Credentials> {
        let access_key_id = self.access_key_id.as_deref().filter(|v| !v.is_empty())?;
        let secret = self.secret_access_key.as_deref().filter(|v| !v.is_empty())?;
        let credentials = Credentials::new(access_key_id, secret);
        Some(match self.session_token.as_deref().filter(|v| !v.is_empty()) {
            Some(token) => credentials.with_session_token(token),
            None => credentials,
        })
    }

    /// Build a config from `PARAMSTORE_*` and `AWS_*` environment variables.
    ///
    /// Unset variables keep their defaults; unparsable ones are an error.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("PARAMSTORE_PATH") {
            config.path = path;
        }
        if let Some(delimiter) = lookup("PARAMSTORE_DELIMITER") {
            config.delimiter = delimiter;
        }
        if let Some(raw) = lookup("PARAMSTORE_WITH_DECRYPTION") {
            config.with_decryption = parse_bool("PARAMSTORE_WITH_DECRYPTION", &raw)?;
        }
        if let Some(raw) = lookup("PARAMSTORE_RECURSIVE") {
            config.recursive = parse_bool("PARAMSTORE_RECURSIVE", &raw)?;
        }
        if let Some(raw) = lookup("PARAMSTORE_WATCH_INTERVAL_SECS") {
            let secs = parse_u64("PARAMSTORE_WATCH_INTERVAL_SECS", &raw)?;
            config.watch_interval = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("PARAMSTORE_PAGE_SIZE") {
            let size = parse_u64("PARAMSTORE_PAGE_SIZE", &raw)?;
            config.page_size = Some(u32::try_from(size).map_err(|_| invalid("PARAMSTORE_PAGE_SIZE", &raw))?);
        }
        if let Some(endpoint) = lookup("PARAMSTORE_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }
        config.region = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION"));
        config.access_key_id = lookup("AWS_ACCESS_KEY_ID");
        config.secret_access_key = lookup("AWS_SECRET_ACCESS_KEY");
        config.session_token = lookup("AWS_SESSION_TOKEN");
        config.role_arn = lookup("PARAMSTORE_ROLE_ARN");
        config.sts_endpoint = lookup("PARAMSTORE_STS_ENDPOINT");

        Ok(config.normalized())
    }
}

fn invalid(key: &str, value: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Parse a boolean flag value ("1"/"0", "true"/"false", "yes"/"no").
pub(crate) fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigurationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}

pub(crate) fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigurationError> {
    raw.trim().parse::<u64>().map_err(|_| invalid(key, raw))
}
