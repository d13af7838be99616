//! Error category classification for unified error handling.
//!
//! Categories let callers decide whether a failure is worth waiting out
//! (the next poll tick will try again) or needs someone to fix the setup.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connectivity to the parameter store (connection refused, DNS, timeout).
    /// Generally transient and retryable.
    Network,

    /// The store rejected the caller's identity or permissions.
    Auth,

    /// Store-side failures (5xx, throttling, internal errors).
    /// Generally transient and retryable after delay.
    Server,

    /// Misuse of the provider API (unsupported operation, malformed response handling).
    Client,

    /// Caller-supplied input that cannot be used as-is (e.g. a key transform
    /// that produces empty keys).
    User,

    /// Local runtime/OS failures.
    System,

    /// Missing or invalid provider configuration.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns a human-readable description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Auth => "Authentication or authorization problem",
            ErrorCategory::Server => "Parameter store service issue",
            ErrorCategory::Client => "Unsupported use of the provider",
            ErrorCategory::User => "Invalid caller input",
            ErrorCategory::System => "System error",
            ErrorCategory::Configuration => "Configuration problem",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => {
                "Check connectivity to the parameter store endpoint; polling retries on the next tick"
            }
            ErrorCategory::Auth => "Check the credentials and the permissions granted on the parameter path",
            ErrorCategory::Server => {
                "The parameter store may be throttling or unavailable. Please try again later"
            }
            ErrorCategory::Client => "Use an operation this provider supports",
            ErrorCategory::User => "Check the key transform and the parameter names it receives",
            ErrorCategory::System => "Check the local runtime environment",
            ErrorCategory::Configuration => "Check your provider configuration",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Client.is_retryable());
        assert!(!ErrorCategory::User.is_retryable());
        assert!(!ErrorCategory::System.is_retryable());
        assert!(!ErrorCategory::Configuration.is_retryable());
    }

    #[test]
    fn test_category_as_str() {
        assert_eq!(ErrorCategory::Network.as_str(), "network");
        assert_eq!(ErrorCategory::Auth.as_str(), "auth");
        assert_eq!(ErrorCategory::Server.as_str(), "server");
        assert_eq!(ErrorCategory::Client.as_str(), "client");
        assert_eq!(ErrorCategory::User.as_str(), "user");
        assert_eq!(ErrorCategory::System.as_str(), "system");
        assert_eq!(ErrorCategory::Configuration.as_str(), "configuration");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", ErrorCategory::Network), "network");
        assert_eq!(format!("{}", ErrorCategory::Configuration), "configuration");
    }

    #[test]
    fn test_category_recovery_hint() {
        assert!(ErrorCategory::Network.recovery_hint().contains("next tick"));
        assert!(ErrorCategory::Auth.recovery_hint().contains("permissions"));
        assert!(ErrorCategory::Configuration
            .recovery_hint()
            .contains("configuration"));
    }
}
