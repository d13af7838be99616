//! Unified error handling for the parameter-store provider.
//!
//! - **Error Categories**: classification used for retry and messaging decisions
//! - **Domain errors**: configuration and retrieval failures
//! - **Unified Error Type**: `ParamStoreError` returned by every public operation
//! - **Error Context**: operation/path/page information attached on the fetch path
//! - **Result Type Alias**: `ParamResult<T>`
//!
//! # Error Categories
//!
//! | Error | Category | Retryable |
//! |-------|----------|-----------|
//! | `Configuration` | Configuration | No |
//! | `Retrieval` (connection, timeout) | Network | Yes |
//! | `Retrieval` (throttled, 5xx) | Server | Yes |
//! | `Retrieval` (access denied) | Auth | No |
//! | `EmptyKey` | User | No |
//! | `UnsupportedOperation` | Client | No |
//!
//! A failed poll tick is never fatal to the watch loop: the error goes to the
//! callback and the next tick fetches again.

mod category;
mod configuration;
mod context;
mod paramstore_error;
mod result;
mod retrieval;

pub use category::ErrorCategory;
pub use configuration::ConfigurationError;
pub use context::ErrorContext;
pub use paramstore_error::ParamStoreError;
pub use result::{ParamResult, ResultExt};
pub use retrieval::RetrievalError;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_error_unification() {
        let config: ParamStoreError = ConfigurationError::MissingPath.into();
        let fetch: ParamStoreError = RetrievalError::Timeout {
            message: "30s".to_string(),
        }
        .into();
        let empty = ParamStoreError::EmptyKey {
            name: "/a".to_string(),
        };

        assert_eq!(config.category(), ErrorCategory::Configuration);
        assert_eq!(fetch.category(), ErrorCategory::Network);
        assert_eq!(empty.category(), ErrorCategory::User);

        for err in [&config, &fetch, &empty] {
            assert!(!err.error_code().is_empty());
            assert!(!err.recovery_hint().is_empty());
        }
    }

    #[test]
    fn test_retry_logic() {
        let retryable: Vec<ParamStoreError> = vec![
            RetrievalError::Timeout {
                message: "t".to_string(),
            }
            .into(),
            RetrievalError::Throttled {
                message: "t".to_string(),
            }
            .into(),
        ];
        for err in retryable {
            assert!(err.is_retryable(), "Expected {:?} to be retryable", err);
        }

        let permanent: Vec<ParamStoreError> = vec![
            ConfigurationError::MissingPath.into(),
            ParamStoreError::EmptyKey {
                name: "x".to_string(),
            },
            ParamStoreError::UnsupportedOperation {
                provider: "paramstore",
                operation: "read_bytes",
            },
        ];
        for err in permanent {
            assert!(!err.is_retryable(), "Expected {:?} to not be retryable", err);
        }
    }
}
