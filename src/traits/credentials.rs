//! Signing credentials abstraction.
//!
//! The HTTP parameter source asks a [`CredentialsProvider`] for a key pair
//! before every request, so static keys, environment keys and assumed-role
//! sessions all plug in the same way.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RetrievalError;

/// An AWS access key pair, optionally scoped to a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Present for temporary (STS) credentials
    pub session_token: Option<String>,
    /// When temporary credentials stop working
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Long-lived key pair.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expires_at: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether these credentials are still usable `margin` from `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => now + margin < expires_at,
            None => true,
        }
    }
}

// Never print the secret or the session token.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of signing credentials.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Current credentials. Implementations cache and refresh as needed.
    ///
    /// Fails with `RetrievalError::Credentials` when none can be produced.
    async fn credentials(&self) -> Result<Credentials, RetrievalError>;
}
