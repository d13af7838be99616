//! Errors raised while retrieving parameter pages.
//!
//! Any of these aborts the pagination pass in progress. During `read()` they
//! are returned to the caller; during polling they are delivered through the
//! watch callback and the loop carries on at the next tick.

use thiserror::Error;

/// Failure of a single paginated retrieval call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    /// Could not reach the parameter store.
    #[error("connection to {endpoint} failed: {message}")]
    ConnectionFailed { endpoint: String, message: String },

    /// The request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The caller is not allowed to read the requested path.
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    /// No usable signing credentials (missing, or the role could not be assumed).
    #[error("credentials unavailable: {message}")]
    Credentials { message: String },

    /// The store throttled the request.
    #[error("request throttled: {message}")]
    Throttled { message: String },

    /// The store returned an error response.
    #[error("parameter store error ({status}) {code}: {message}")]
    ServiceError {
        status: u16,
        code: String,
        message: String,
    },

    /// The response could not be understood.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The store handed back the continuation token it was just given.
    #[error("pagination stalled on continuation token {token:?}")]
    StalledPagination { token: String },

    /// Anything else reported by the collaborator.
    #[error("retrieval failed: {message}")]
    Other { message: String },
}

impl RetrievalError {
    /// Check if this error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            RetrievalError::ConnectionFailed { .. } => true,
            RetrievalError::Timeout { .. } => true,
            RetrievalError::Throttled { .. } => true,
            RetrievalError::ServiceError { status, .. } => *status >= 500,
            RetrievalError::AccessDenied { .. } => false,
            RetrievalError::Credentials { .. } => false,
            RetrievalError::InvalidResponse { .. } => false,
            RetrievalError::StalledPagination { .. } => false,
            RetrievalError::Other { .. } => false,
        }
    }

    /// Whether the store refused the caller's identity or permissions.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            RetrievalError::AccessDenied { .. } | RetrievalError::Credentials { .. }
        )
            || matches!(self, RetrievalError::ServiceError { status, .. } if *status == 401 || *status == 403)
    }

    /// Whether the failure happened on the store's side.
    pub fn is_server(&self) -> bool {
        match self {
            RetrievalError::Throttled { .. } => true,
            RetrievalError::ServiceError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            RetrievalError::ConnectionFailed { .. } => "E_FETCH_CONN",
            RetrievalError::Timeout { .. } => "E_FETCH_TIMEOUT",
            RetrievalError::AccessDenied { .. } => "E_FETCH_DENIED",
            RetrievalError::Credentials { .. } => "E_FETCH_CREDENTIALS",
            RetrievalError::Throttled { .. } => "E_FETCH_THROTTLED",
            RetrievalError::ServiceError { .. } => "E_FETCH_SERVICE",
            RetrievalError::InvalidResponse { .. } => "E_FETCH_INVALID",
            RetrievalError::StalledPagination { .. } => "E_FETCH_STALLED",
            RetrievalError::Other { .. } => "E_FETCH_OTHER",
        }
    }

    /// Convenience constructor for collaborator-specific failures.
    pub fn other(message: impl Into<String>) -> Self {
        RetrievalError::Other {
            message: message.into(),
        }
    }
}
