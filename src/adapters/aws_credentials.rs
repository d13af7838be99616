//! Credentials providers: a static key pair, and an STS assumed role.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::sigv4::RequestSigner;
use crate::error::RetrievalError;
use crate::traits::{Credentials, CredentialsProvider, Headers, HttpClient, Response};

/// STS API version sent with `AssumeRole`.
pub const STS_API_VERSION: &str = "2011-06-15";

/// Lifetime requested for assumed-role sessions.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(3600);

/// Cached session credentials are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Always returns the same key pair.
#[derive(Debug, Clone)]
pub struct StaticCredentialsProvider {
    credentials: Credentials,
}

impl StaticCredentialsProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentialsProvider {
    async fn credentials(&self) -> Result<Credentials, RetrievalError> {
        Ok(self.credentials.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleEnvelope {
    assume_role_response: AssumeRoleResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    assume_role_result: AssumeRoleResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResult {
    credentials: StsCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    #[serde(default)]
    expiration: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsErrorEnvelope {
    #[serde(default)]
    error: StsError,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// STS reports expiry as epoch seconds in JSON; accept RFC 3339 as well.
fn parse_expiration(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    }
}

/// Temporary credentials for `role_arn`, obtained with `AssumeRole` using the
/// base provider's keys and cached until shortly before they expire.
pub struct AssumeRoleProvider<C: HttpClient> {
    client: C,
    base: Arc<dyn CredentialsProvider>,
    role_arn: String,
    session_name: String,
    duration: Duration,
    endpoint: String,
    signer: RequestSigner,
    cached: Mutex<Option<Credentials>>,
}

impl<C: HttpClient> AssumeRoleProvider<C> {
    /// Provider calling STS at `endpoint`, signing for `region`.
    pub fn new(
        client: C,
        base: Arc<dyn CredentialsProvider>,
        role_arn: impl Into<String>,
        endpoint: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base,
            role_arn: role_arn.into(),
            session_name: format!("paramstore-{}", Utc::now().timestamp()),
            duration: DEFAULT_SESSION_DURATION,
            endpoint: endpoint.into(),
            signer: RequestSigner::new(region, "sts"),
            cached: Mutex::new(None),
        }
    }

    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = name.into();
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    async fn assume(&self) -> Result<Credentials, RetrievalError> {
        let base = self.base.credentials().await?;
        let body = format!(
            "Action=AssumeRole&Version={}&RoleArn={}&RoleSessionName={}&DurationSeconds={}",
            STS_API_VERSION,
            urlencoding::encode(&self.role_arn),
            urlencoding::encode(&self.session_name),
            self.duration.as_secs()
        );

        let mut headers = Headers::new();
        headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded; charset=utf-8".to_string(),
        );
        headers.insert("Accept".to_string(), "application/json".to_string());
        let headers = self
            .signer
            .sign(&base, "POST", &self.endpoint, &headers, &body, Utc::now())?;

        let response = self
            .client
            .post(&self.endpoint, &body, &headers)
            .await
            .map_err(|e| RetrievalError::Credentials {
                message: format!("cannot assume {}: {}", self.role_arn, e),
            })?;

        if !response.is_success() {
            return Err(self.sts_error(&response));
        }

        let parsed: AssumeRoleEnvelope =
            response
                .json()
                .map_err(|e| RetrievalError::InvalidResponse {
                    message: format!("AssumeRole: {}", e),
                })?;
        let sts = parsed.assume_role_response.assume_role_result.credentials;

        let mut credentials =
            Credentials::new(sts.access_key_id, sts.secret_access_key).with_session_token(sts.session_token);
        if let Some(expires_at) = parse_expiration(&sts.expiration) {
            credentials = credentials.with_expiry(expires_at);
        }
        Ok(credentials)
    }

    fn sts_error(&self, response: &Response) -> RetrievalError {
        let envelope: StsErrorEnvelope = response.json().unwrap_or_default();
        let StsError { code, message } = envelope.error;

        if code == "Throttling" {
            RetrievalError::Throttled { message }
        } else if response.status >= 500 {
            RetrievalError::ServiceError {
                status: response.status,
                code,
                message,
            }
        } else {
            RetrievalError::Credentials {
                message: format!("cannot assume {}: {} {}", self.role_arn, code, message),
            }
        }
    }
}

#[async_trait]
impl<C: HttpClient> CredentialsProvider for AssumeRoleProvider<C> {
    async fn credentials(&self) -> Result<Credentials, RetrievalError> {
        let mut cached = self.cached.lock().await;
        let margin = chrono::Duration::seconds(REFRESH_MARGIN_SECS);

        if let Some(creds) = cached.as_ref() {
            if creds.is_fresh(Utc::now(), margin) {
                return Ok(creds.clone());
            }
        }

        tracing::debug!("Assuming role {}", self.role_arn);
        let fresh = self.assume().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}
