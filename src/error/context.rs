//! Error context for enriched error information.
//!
//! Attached to errors on the fetch path so a failed page can be traced back
//! to the parameter path, the page number and the operation that issued it.

use chrono::{DateTime, Utc};
use std::fmt;

/// Context information attached to errors for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Parameter path the operation was working under.
    pub path: Option<String>,

    /// 1-based page number within the pagination pass, if applicable.
    pub page: Option<u32>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Optional component/module where the error originated.
    pub component: Option<String>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            path: None,
            page: None,
            timestamp: Utc::now(),
            component: None,
        }
    }

    /// Set the parameter path for this context.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the page number for this context.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the component for this context.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref path) = self.path {
            parts.push(format!("path={}", path));
        }

        if let Some(page) = self.page {
            parts.push(format!("page={}", page));
        }

        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        if let Some(ref path) = self.path {
            write!(f, " path={}", path)?;
        }
        if let Some(page) = self.page {
            write!(f, " page={}", page)?;
        }
        Ok(())
    }
}
