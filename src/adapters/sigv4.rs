//! AWS Signature Version 4 request signing.
//!
//! Only what the parameter store and STS need: header-based signing of a
//! request with a fully buffered body.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::RetrievalError;
use crate::traits::{Credentials, Headers};

type HmacSha256 = Hmac<Sha256>;

/// Algorithm name carried in the `Authorization` header.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signs requests for one service in one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSigner {
    region: String,
    service: String,
}

impl RequestSigner {
    pub fn new(region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Return `headers` plus `X-Amz-Date`, `Authorization` and, for session
    /// credentials, `X-Amz-Security-Token`.
    ///
    /// The `Host` header is signed but not returned; the transport sets it
    /// from the URL.
    pub fn sign(
        &self,
        credentials: &Credentials,
        method: &str,
        url: &str,
        headers: &Headers,
        body: &str,
        time: DateTime<Utc>,
    ) -> Result<Headers, RetrievalError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| RetrievalError::Other {
            message: format!("cannot sign request to {}: {}", url, e),
        })?;
        let host = host_header(&parsed).ok_or_else(|| RetrievalError::Other {
            message: format!("cannot sign request to {}: no host", url),
        })?;

        let amz_date = time.format("%Y%m%dT%H%M%SZ").to_string();
        let date = time.format("%Y%m%d").to_string();

        let mut signed = headers.clone();
        signed.insert("X-Amz-Date".to_string(), amz_date.clone());
        if let Some(token) = &credentials.session_token {
            signed.insert("X-Amz-Security-Token".to_string(), token.clone());
        }

        let mut canonical: BTreeMap<String, String> = BTreeMap::new();
        canonical.insert("host".to_string(), host);
        for (name, value) in &signed {
            let value = normalize_value(value);
            canonical
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let signed_headers = canonical.keys().cloned().collect::<Vec<_>>().join(";");
        let canonical_headers: String = canonical
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method,
            canonical_uri(&parsed),
            canonical_query(&parsed),
            canonical_headers,
            signed_headers,
            hex_sha256(body.as_bytes())
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex_sha256(canonical_request.as_bytes())
        );

        let key = signing_key(&credentials.secret_access_key, &date, &self.region, &self.service)?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        signed.insert(
            "Authorization".to_string(),
            format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
            ),
        );
        Ok(signed)
    }
}

/// Derive the per-day, per-region, per-service signing key.
pub fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, RetrievalError> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, RetrievalError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| RetrievalError::Credentials {
        message: format!("unusable signing key: {}", e),
    })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn host_header(url: &reqwest::Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn canonical_uri(url: &reqwest::Url) -> &str {
    match url.path() {
        "" => "/",
        path => path,
    }
}

fn canonical_query(url: &reqwest::Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (urlencoding::encode(&k).into_owned(), urlencoding::encode(&v).into_owned()))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Trim and collapse inner runs of spaces.
fn normalize_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
