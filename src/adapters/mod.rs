//! Concrete implementations of the trait seams in `crate::traits`.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP transport using reqwest
//! - [`HttpParameterSource`] - `GetParametersByPath` over any [`HttpClient`](crate::traits::HttpClient)
//! - [`RequestSigner`] - SigV4 request signing
//! - [`StaticCredentialsProvider`], [`AssumeRoleProvider`] - signing credentials
//!
//! The [`mock`] submodule provides test doubles for the seams.

pub mod aws_credentials;
pub mod mock;
pub mod reqwest_http;
pub mod sigv4;
pub mod ssm_http;

pub use aws_credentials::{AssumeRoleProvider, StaticCredentialsProvider};
pub use mock::{MockCredentialsProvider, MockHttpClient, MockParameterSource};
pub use reqwest_http::ReqwestHttpClient;
pub use sigv4::RequestSigner;
pub use ssm_http::HttpParameterSource;
