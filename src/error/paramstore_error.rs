//! Unified error type for the parameter-store provider.
//!
//! `ParamStoreError` is what every public operation returns: `read()`
//! synchronously, `watch()` callbacks asynchronously.

use std::fmt;

use super::category::ErrorCategory;
use super::configuration::ConfigurationError;
use super::context::ErrorContext;
use super::retrieval::RetrievalError;

/// Unified error type for the provider.
#[derive(Debug, Clone)]
pub enum ParamStoreError {
    /// The provider is missing required configuration.
    Configuration(ConfigurationError),

    /// A paginated retrieval call failed; the pass was abandoned.
    Retrieval(RetrievalError),

    /// The key transform turned a parameter name into an empty key.
    EmptyKey { name: String },

    /// The operation is not offered by this provider kind.
    UnsupportedOperation {
        provider: &'static str,
        operation: &'static str,
    },

    /// Wrapped error with additional context.
    WithContext {
        error: Box<ParamStoreError>,
        context: ErrorContext,
    },
}

impl ParamStoreError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ParamStoreError::Configuration(_) => ErrorCategory::Configuration,
            ParamStoreError::Retrieval(err) => {
                if err.is_auth() {
                    ErrorCategory::Auth
                } else if err.is_server() {
                    ErrorCategory::Server
                } else {
                    match err {
                        RetrievalError::ConnectionFailed { .. } | RetrievalError::Timeout { .. } => {
                            ErrorCategory::Network
                        }
                        _ => ErrorCategory::Server,
                    }
                }
            }
            ParamStoreError::EmptyKey { .. } => ErrorCategory::User,
            ParamStoreError::UnsupportedOperation { .. } => ErrorCategory::Client,
            ParamStoreError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ParamStoreError::Retrieval(err) => err.is_retryable(),
            ParamStoreError::WithContext { error, .. } => error.is_retryable(),
            _ => false,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ParamStoreError::Configuration(err) => err.error_code(),
            ParamStoreError::Retrieval(err) => err.error_code(),
            ParamStoreError::EmptyKey { .. } => "E_EMPTY_KEY",
            ParamStoreError::UnsupportedOperation { .. } => "E_UNSUPPORTED",
            ParamStoreError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        ParamStoreError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ParamStoreError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &ParamStoreError {
        match self {
            ParamStoreError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    /// True for missing/invalid configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self.inner(), ParamStoreError::Configuration(_))
    }

    /// True for a failed page retrieval.
    pub fn is_retrieval(&self) -> bool {
        matches!(self.inner(), ParamStoreError::Retrieval(_))
    }

    /// True when the key transform produced an empty key.
    pub fn is_empty_key(&self) -> bool {
        matches!(self.inner(), ParamStoreError::EmptyKey { .. })
    }

    /// True for operations this provider does not offer.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.inner(), ParamStoreError::UnsupportedOperation { .. })
    }

    /// The underlying retrieval error, if this is one.
    pub fn as_retrieval(&self) -> Option<&RetrievalError> {
        match self.inner() {
            ParamStoreError::Retrieval(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for ParamStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamStoreError::Configuration(err) => write!(f, "{}", err),
            ParamStoreError::Retrieval(err) => write!(f, "{}", err),
            ParamStoreError::EmptyKey { name } => {
                write!(f, "transformed key is empty (parameter {:?})", name)
            }
            ParamStoreError::UnsupportedOperation {
                provider,
                operation,
            } => {
                write!(f, "{} provider does not support {}", provider, operation)
            }
            ParamStoreError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for ParamStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParamStoreError::Configuration(err) => Some(err),
            ParamStoreError::Retrieval(err) => Some(err),
            ParamStoreError::EmptyKey { .. } => None,
            ParamStoreError::UnsupportedOperation { .. } => None,
            ParamStoreError::WithContext { error, .. } => error.source(),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<ConfigurationError> for ParamStoreError {
    fn from(err: ConfigurationError) -> Self {
        ParamStoreError::Configuration(err)
    }
}

impl From<RetrievalError> for ParamStoreError {
    fn from(err: RetrievalError) -> Self {
        ParamStoreError::Retrieval(err)
    }
}
