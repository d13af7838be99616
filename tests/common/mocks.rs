//! Mock implementations for test fixtures.
//!
//! Re-exports the mocks from `paramstore::adapters::mock` and adds builders
//! for canned `GetParametersByPath` responses.

pub use paramstore::adapters::mock::{MockHttpClient, MockParameterSource, MockResponse};
pub use paramstore::traits::{Headers, HttpClient, Response};

use bytes::Bytes;
use serde_json::{json, Value};

use paramstore::paramstore::ParameterRecord;

/// Wire body for one page of parameters.
pub fn page_body(parameters: &[ParameterRecord], next_token: Option<&str>) -> Value {
    let parameters: Vec<Value> = parameters
        .iter()
        .map(|p| {
            json!({
                "Name": p.name,
                "Type": "String",
                "Value": p.value,
                "Version": p.version,
                "ARN": p.identity,
                "DataType": "text"
            })
        })
        .collect();

    match next_token {
        Some(token) => json!({ "Parameters": parameters, "NextToken": token }),
        None => json!({ "Parameters": parameters }),
    }
}

/// Wire body of a JSON-protocol error.
pub fn error_body(kind: &str, message: &str) -> Value {
    json!({ "__type": kind, "message": message })
}

/// Configuration for setting up mock HTTP responses.
pub struct MockHttpConfig {
    client: MockHttpClient,
}

impl MockHttpConfig {
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// Configures a JSON response for a URL.
    pub fn with_json_response(self, url: &str, status: u16, json: &Value) -> Self {
        self.client.set_response(
            url,
            MockResponse::Success(Response::new(status, Bytes::from(json.to_string()))),
        );
        self
    }

    pub fn build(self) -> MockHttpClient {
        self.client
    }
}

impl Default for MockHttpConfig {
    fn default() -> Self {
        Self::new()
    }
}
