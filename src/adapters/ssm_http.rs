//! Parameter source speaking the SSM `GetParametersByPath` JSON protocol.
//!
//! Requests go to a regional endpoint or an explicit override (a local
//! emulator or a signing proxy). With [`HttpParameterSource::with_signing`]
//! every request is signed with SigV4; without it requests go out unsigned.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::sigv4::RequestSigner;
use crate::error::RetrievalError;
use crate::paramstore::ParameterRecord;
use crate::traits::{
    CredentialsProvider, Headers, HttpClient, HttpError, PageRequest, ParameterPage, ParameterSource, Response,
};

/// `X-Amz-Target` value for listing parameters by path.
pub const GET_PARAMETERS_BY_PATH: &str = "AmazonSSM.GetParametersByPath";

/// Content type of the JSON 1.1 protocol.
pub const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersByPathRequest<'a> {
    path: &'a str,
    with_decryption: bool,
    recursive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersByPathResponse {
    #[serde(default)]
    parameters: Vec<WireParameter>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireParameter {
    name: String,
    #[serde(default)]
    value: String,
    #[serde(rename = "ARN", default)]
    arn: Option<String>,
    #[serde(default)]
    version: i64,
}

impl From<WireParameter> for ParameterRecord {
    fn from(p: WireParameter) -> Self {
        // Emulators sometimes omit the ARN; the name is stable enough there.
        let identity = p.arn.unwrap_or_else(|| p.name.clone());
        ParameterRecord::new(p.name, p.value, identity, p.version)
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireError {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

#[derive(Clone)]
struct Signing {
    signer: RequestSigner,
    credentials: Arc<dyn CredentialsProvider>,
}

impl std::fmt::Debug for Signing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signing")
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

/// [`ParameterSource`] over any [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpParameterSource<C: HttpClient> {
    client: C,
    endpoint: String,
    headers: Headers,
    signing: Option<Signing>,
}

impl<C: HttpClient> HttpParameterSource<C> {
    /// Source posting to `endpoint` (e.g. `https://ssm.eu-west-1.amazonaws.com/`).
    pub fn new(client: C, endpoint: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.insert("X-Amz-Target".to_string(), GET_PARAMETERS_BY_PATH.to_string());
        headers.insert("Content-Type".to_string(), AMZ_JSON_CONTENT_TYPE.to_string());

        Self {
            client,
            endpoint: endpoint.into(),
            headers,
            signing: None,
        }
    }

    /// Sign every request with credentials from `credentials`.
    pub fn with_signing(mut self, signer: RequestSigner, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.signing = Some(Signing { signer, credentials });
        self
    }

    pub fn is_signed(&self) -> bool {
        self.signing.is_some()
    }

    /// Point the source at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Send a static header with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: HttpError) -> RetrievalError {
        match err {
            HttpError::ConnectionFailed(message) => RetrievalError::ConnectionFailed {
                endpoint: self.endpoint.clone(),
                message,
            },
            HttpError::Timeout(message) => RetrievalError::Timeout { message },
            HttpError::InvalidUrl(url) => RetrievalError::ConnectionFailed {
                endpoint: self.endpoint.clone(),
                message: format!("invalid URL {}", url),
            },
            HttpError::Other(message) => RetrievalError::Other { message },
        }
    }
}

/// Map a non-2xx response to a retrieval error.
fn service_error(response: &Response) -> RetrievalError {
    let wire: WireError = response.json().unwrap_or_default();
    let code = wire
        .kind
        .as_deref()
        .map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_string())
        .unwrap_or_default();
    let message = wire
        .message
        .or_else(|| response.text().ok().filter(|t| !t.is_empty()))
        .unwrap_or_else(|| format!("HTTP {}", response.status));

    match code.as_str() {
        "ThrottlingException" | "TooManyRequestsException" => RetrievalError::Throttled { message },
        "AccessDeniedException"
        | "UnrecognizedClientException"
        | "ExpiredTokenException"
        | "InvalidSignatureException"
        | "MissingAuthenticationTokenException" => RetrievalError::AccessDenied { message },
        _ if response.status == 401 || response.status == 403 => {
            RetrievalError::AccessDenied { message }
        }
        _ => RetrievalError::ServiceError {
            status: response.status,
            code,
            message,
        },
    }
}

#[async_trait]
impl<C: HttpClient> ParameterSource for HttpParameterSource<C> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ParameterPage, RetrievalError> {
        let body = GetParametersByPathRequest {
            path: &request.path,
            with_decryption: request.with_decryption,
            recursive: request.recursive,
            max_results: request.max_results,
            next_token: request.next_token.as_deref(),
        };
        let body = serde_json::to_string(&body).map_err(|e| RetrievalError::other(e.to_string()))?;

        let headers = match &self.signing {
            Some(signing) => {
                let credentials = signing.credentials.credentials().await?;
                signing
                    .signer
                    .sign(&credentials, "POST", &self.endpoint, &self.headers, &body, Utc::now())?
            }
            None => self.headers.clone(),
        };

        tracing::trace!("POST {} {}", self.endpoint, GET_PARAMETERS_BY_PATH);
        let response = self
            .client
            .post(&self.endpoint, &body, &headers)
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.is_success() {
            return Err(service_error(&response));
        }

        let parsed: GetParametersByPathResponse =
            response
                .json()
                .map_err(|e| RetrievalError::InvalidResponse {
                    message: e.to_string(),
                })?;

        Ok(ParameterPage::new(
            parsed.parameters.into_iter().map(ParameterRecord::from).collect(),
            parsed.next_token,
        ))
    }
}
