//! Result type alias for provider operations.

use super::context::ErrorContext;
use super::paramstore_error::ParamStoreError;
use super::retrieval::RetrievalError;

/// Type alias for Results using ParamStoreError.
pub type ParamResult<T> = Result<T, ParamStoreError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> ParamResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> ParamResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T> ResultExt<T> for ParamResult<T> {
    fn context(self, ctx: ErrorContext) -> ParamResult<T> {
        self.map_err(|e| e.with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> ParamResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for Result<T, RetrievalError> {
    fn context(self, ctx: ErrorContext) -> ParamResult<T> {
        self.map_err(|e| ParamStoreError::from(e).with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> ParamResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| ParamStoreError::from(e).with_context(f()))
    }
}
