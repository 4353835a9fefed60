//! Upstream call plumbing.
//!
//! [`Transport`] is the seam between the executor and the network; the
//! production implementation lives in [`http`].

use std::fmt::{Display, Formatter};
use std::future::Future;

use serde_json::Value;
use thiserror::Error;

pub mod abort;
pub mod executor;
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;

pub use abort::{AbortHandle, AbortSignal};
pub use executor::{ProxyRequestExecutor, RequestOptions};

/// HTTP verbs used against the upstream API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved request handed to a [`Transport`].
#[derive(Clone, Debug, PartialEq)]
pub struct UpstreamRequest {
    pub method: HttpMethod,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Raw upstream reply; the body has been read exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures that happen before a complete response is available.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream connection failed: {0}")]
    Network(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Sends one request to the upstream service.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = TransportResult<UpstreamResponse>> + Send;
}
