//! Generic upstream call with normalized results.

use std::time::Duration;

use serde_json::Value;

use crate::domain::envelope::ResponseEnvelope;
use crate::errors::{ErrorEnvelope, ErrorKind, UpstreamFailure, map_failure};
use crate::models::auth::TokenProvider;
use crate::proxy::abort::AbortSignal;
use crate::proxy::http::ReqwestTransport;
use crate::proxy::{HttpMethod, Transport, TransportError, UpstreamRequest, UpstreamResponse};

/// Deadline applied when neither the executor nor the call sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-call switches for [`ProxyRequestExecutor::execute`].
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub require_auth: bool,
    pub success_message: String,
    pub timeout: Option<Duration>,
    pub abort: Option<AbortSignal>,
}

impl RequestOptions {
    pub fn new(success_message: impl Into<String>) -> Self {
        Self {
            require_auth: false,
            success_message: success_message.into(),
            timeout: None,
            abort: None,
        }
    }

    pub fn require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn abort(mut self, signal: AbortSignal) -> Self {
        self.abort = Some(signal);
        self
    }
}

/// Stateless executor for calls against one upstream base URL.
///
/// Never fails past its boundary: every outcome is a [`ResponseEnvelope`].
#[derive(Clone, Debug)]
pub struct ProxyRequestExecutor<X = ReqwestTransport> {
    transport: X,
    base_url: String,
    timeout: Duration,
}

impl<X: Transport> ProxyRequestExecutor<X> {
    pub fn new(transport: X, base_url: impl AsRef<str>) -> Self {
        Self {
            transport,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        }
    }

    /// Issues `method endpoint` upstream and normalizes the outcome.
    ///
    /// With `require_auth` set and no token available, returns
    /// `UNAUTHORIZED` without touching the transport. A token is forwarded
    /// whenever one exists.
    pub async fn execute<P>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Value>,
        tokens: &P,
        options: RequestOptions,
    ) -> ResponseEnvelope<Value>
    where
        P: TokenProvider + ?Sized,
    {
        match self.try_execute(method, endpoint, body, tokens, &options).await {
            Ok(data) => ResponseEnvelope::ok(data, options.success_message),
            Err(error) => ResponseEnvelope::failure(error),
        }
    }

    async fn try_execute<P>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Value>,
        tokens: &P,
        options: &RequestOptions,
    ) -> Result<Value, ErrorEnvelope>
    where
        P: TokenProvider + ?Sized,
    {
        let bearer = tokens.bearer_token().filter(|token| !token.is_empty());
        if options.require_auth && bearer.is_none() {
            log::warn!("Rejecting {method} {endpoint}: no bearer token");
            return Err(ErrorEnvelope::unauthorized());
        }

        let request = UpstreamRequest {
            method,
            url: self.url_for(endpoint),
            bearer,
            body,
        };
        let timeout = options.timeout.unwrap_or(self.timeout);
        let abort = options.abort.clone().unwrap_or_else(AbortSignal::never);

        if abort.is_aborted() {
            return Err(map_failure(UpstreamFailure::Timeout));
        }

        let outcome = tokio::select! {
            result = tokio::time::timeout(timeout, self.transport.send(request)) => {
                result.unwrap_or(Err(TransportError::Timeout))
            }
            _ = abort.aborted() => {
                log::info!("Aborted {method} {endpoint}");
                return Err(map_failure(UpstreamFailure::Timeout));
            }
        };

        match outcome {
            Ok(response) => normalize(method, endpoint, response),
            Err(err) => {
                log::error!("Upstream {method} {endpoint} failed after up to {timeout:?}: {err}");
                Err(err.into())
            }
        }
    }
}

fn normalize(
    method: HttpMethod,
    endpoint: &str,
    response: UpstreamResponse,
) -> Result<Value, ErrorEnvelope> {
    if !response.is_success() {
        let error = map_failure(UpstreamFailure::Status {
            status: response.status,
            body: Some(&response.body),
        });
        if response.status >= 500 {
            log::error!("Upstream {method} {endpoint} failed with {}: {error}", response.status);
        } else {
            log::warn!("Upstream {method} {endpoint} rejected with {}: {error}", response.status);
        }
        return Err(error);
    }

    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(body) => Ok(unwrap_data(body)),
        Err(err) => {
            log::error!("Upstream {method} {endpoint} returned invalid JSON: {err}");
            Err(ErrorEnvelope::new(ErrorKind::DefaultError)
                .with_message("Invalid response from upstream service"))
        }
    }
}

/// `body.data` when present and non-null, otherwise the body itself.
fn unwrap_data(mut body: Value) -> Value {
    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => data,
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::models::auth::Anonymous;
    use crate::proxy::AbortHandle;

    /// Replays canned outcomes and records what was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: Mutex<Vec<Result<UpstreamResponse, TransportError>>>,
        sent: Mutex<Vec<UpstreamRequest>>,
    }

    impl ScriptedTransport {
        fn replying(status: u16, body: &str) -> Self {
            let transport = Self::default();
            transport.outcomes.lock().unwrap().push(Ok(UpstreamResponse {
                status,
                body: body.to_string(),
            }));
            transport
        }

        fn failing(error: TransportError) -> Self {
            let transport = Self::default();
            transport.outcomes.lock().unwrap().push(Err(error));
            transport
        }

        fn sent(&self) -> Vec<UpstreamRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(TransportError::Network("no script".into())))
        }
    }

    /// Never answers.
    struct HangingTransport;

    impl Transport for HangingTransport {
        async fn send(
            &self,
            _request: UpstreamRequest,
        ) -> Result<UpstreamResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn token() -> Option<String> {
        Some("secret".to_string())
    }

    #[tokio::test]
    async fn missing_token_short_circuits() {
        let transport = ScriptedTransport::replying(200, "{}");
        let executor = ProxyRequestExecutor::new(transport, "http://up");

        let envelope = executor
            .execute(
                HttpMethod::Delete,
                "/api/plants/1",
                None,
                &Anonymous,
                RequestOptions::new("Deleted").require_auth(true),
            )
            .await;

        assert!(!envelope.success);
        assert_eq!(envelope.code, 401);
        assert!(envelope.data.is_none());
        assert!(executor.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn success_unwraps_nested_data() {
        let executor = ProxyRequestExecutor::new(
            ScriptedTransport::replying(200, r#"{"code":200,"data":{"id":7},"message":"ok"}"#),
            "http://up/",
        );

        let envelope = executor
            .execute(
                HttpMethod::Get,
                "/api/plants/7",
                None,
                &token,
                RequestOptions::new("Plant loaded"),
            )
            .await;

        assert_eq!(envelope, ResponseEnvelope::ok(json!({"id": 7}), "Plant loaded"));
        let sent = executor.transport.sent();
        assert_eq!(sent[0].url, "http://up/api/plants/7");
        assert_eq!(sent[0].bearer.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn bare_body_is_used_as_is() {
        let executor = ProxyRequestExecutor::new(
            ScriptedTransport::replying(200, r#"{"content":[],"totalElements":0}"#),
            "http://up",
        );

        let envelope = executor
            .execute(
                HttpMethod::Get,
                "/api/genera/search",
                None,
                &Anonymous,
                RequestOptions::new("ok"),
            )
            .await;

        assert_eq!(envelope.data, Some(json!({"content": [], "totalElements": 0})));
    }

    #[tokio::test]
    async fn empty_success_body_yields_null_data() {
        let executor = ProxyRequestExecutor::new(ScriptedTransport::replying(204, ""), "http://up");

        let envelope = executor
            .execute(
                HttpMethod::Delete,
                "/api/media/3",
                None,
                &token,
                RequestOptions::new("Deleted"),
            )
            .await;

        assert!(envelope.success);
        assert_eq!(envelope.data, Some(Value::Null));
    }

    #[tokio::test]
    async fn upstream_error_goes_through_taxonomy() {
        let executor = ProxyRequestExecutor::new(
            ScriptedTransport::replying(403, r#"{"message":"Experts only"}"#),
            "http://up",
        );

        let envelope = executor
            .execute(
                HttpMethod::Put,
                "/api/research/2",
                Some(json!({"title": "x"})),
                &token,
                RequestOptions::new("Saved").require_auth(true),
            )
            .await;

        assert_eq!((envelope.success, envelope.code), (false, 403));
        assert_eq!(envelope.message, "Experts only");
        assert_eq!(executor.transport.sent()[0].body, Some(json!({"title": "x"})));
    }

    #[tokio::test]
    async fn invalid_json_is_a_default_error() {
        let transport = ScriptedTransport::replying(200, "<html>");
        let executor = ProxyRequestExecutor::new(transport, "http://up");

        let envelope = executor
            .execute(HttpMethod::Get, "/api/plants/1", None, &Anonymous, RequestOptions::new("ok"))
            .await;

        assert_eq!((envelope.success, envelope.code), (false, 500));
    }

    #[tokio::test]
    async fn connection_failure_is_network_error() {
        let executor = ProxyRequestExecutor::new(
            ScriptedTransport::failing(TransportError::Network("refused".into())),
            "http://up",
        );

        let envelope = executor
            .execute(HttpMethod::Get, "/api/plants/1", None, &Anonymous, RequestOptions::new("ok"))
            .await;

        assert_eq!(envelope.code, 503);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_call_times_out() {
        let executor =
            ProxyRequestExecutor::new(HangingTransport, "http://up")
                .with_timeout(Duration::from_secs(2));

        let envelope = executor
            .execute(
                HttpMethod::Get,
                "/api/plants/search",
                None,
                &Anonymous,
                RequestOptions::new("ok"),
            )
            .await;

        assert_eq!(envelope.code, 408);
    }

    #[tokio::test]
    async fn aborted_call_reports_timeout() {
        let executor = ProxyRequestExecutor::new(HangingTransport, "http://up");
        let (handle, signal) = AbortHandle::pair();

        let call = executor.execute(
            HttpMethod::Get,
            "/api/plants/search",
            None,
            &Anonymous,
            RequestOptions::new("ok").abort(signal),
        );
        handle.abort();
        let envelope = call.await;

        assert_eq!(envelope.code, 408);
    }
}
