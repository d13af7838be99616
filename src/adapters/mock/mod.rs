//! Test doubles for the trait seams.
//!
//! - [`MockParameterSource`] - scripted pages, failures and a request log
//! - [`MockHttpClient`] - canned HTTP responses per URL
//! - [`MockCredentialsProvider`] - fixed credentials with queued failures

pub mod credentials;
pub mod http;
pub mod parameter_source;

pub use credentials::MockCredentialsProvider;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use parameter_source::MockParameterSource;
