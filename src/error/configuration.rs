//! Configuration error types.

use thiserror::Error;

/// Problems with how the provider was configured.
///
/// These are never retried: the same configuration fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No parameter path was configured.
    #[error("no parameter path provided")]
    MissingPath,

    /// `watch` was called outside a tokio runtime.
    #[error("watch requires a running tokio runtime")]
    NoRuntime,

    /// Neither a region nor an explicit endpoint was configured.
    #[error("no region or endpoint configured for the parameter store")]
    MissingEndpoint,

    /// Requests to the regional endpoint must be signed, but no access key
    /// pair was configured.
    #[error("no AWS credentials configured for signing requests")]
    MissingCredentials,

    /// An environment variable or CLI flag could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

impl ConfigurationError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigurationError::MissingPath => "CONFIG_MISSING_PATH",
            ConfigurationError::NoRuntime => "CONFIG_NO_RUNTIME",
            ConfigurationError::MissingEndpoint => "CONFIG_MISSING_ENDPOINT",
            ConfigurationError::MissingCredentials => "CONFIG_MISSING_CREDENTIALS",
            ConfigurationError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
        }
    }
}
