//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`ParameterSource`] - Paginated "list parameters under path" call
//! - [`HttpClient`] - HTTP transport used by the HTTP parameter source
//! - [`CredentialsProvider`] - Key pairs used to sign store requests
//! - [`ConfigProvider`] - Capability interface exposed by providers

pub mod credentials;
pub mod http;
pub mod parameter_source;
pub mod provider;

pub use credentials::{Credentials, CredentialsProvider};
pub use http::{Headers, HttpClient, HttpError, Response};
pub use parameter_source::{PageRequest, ParameterPage, ParameterSource};
pub use provider::{Capability, ConfigProvider, WatchCallback};
