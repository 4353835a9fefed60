//! `reqwest`-backed [`Transport`].

use reqwest::Method;

use crate::proxy::{
    HttpMethod, Transport, TransportError, TransportResult, UpstreamRequest, UpstreamResponse,
};

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Shared HTTP client used for every upstream call.
///
/// Deadlines are enforced by the executor, so the client itself carries none.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: UpstreamRequest) -> TransportResult<UpstreamResponse> {
        let UpstreamRequest {
            method,
            url,
            bearer,
            body,
        } = request;

        let mut builder = self.client.request(method.into(), &url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}
