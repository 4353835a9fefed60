//! Client-facing error taxonomy.
//!
//! Every upstream failure, whatever its shape, ends up as exactly one
//! [`ErrorEnvelope`]. The mapping functions here are pure and total.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Fixed set of error kinds exposed to clients.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    TimeoutError,
    UnprocessableEntity,
    TooManyRequests,
    SystemError,
    DefaultError,
    NetworkError,
}

impl ErrorKind {
    /// Canonical numeric code. [`ErrorKind::DefaultError`] reports 500 here,
    /// but envelopes built from an unmapped status keep that status instead.
    pub const fn code(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::TimeoutError => 408,
            ErrorKind::UnprocessableEntity => 422,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::SystemError | ErrorKind::DefaultError => 500,
            ErrorKind::NetworkError => 503,
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad request",
            ErrorKind::Unauthorized => "Authentication required",
            ErrorKind::Forbidden => "You do not have permission to perform this action",
            ErrorKind::NotFound => "Resource not found",
            ErrorKind::TimeoutError => "Request timed out",
            ErrorKind::UnprocessableEntity => "Submitted data could not be processed",
            ErrorKind::TooManyRequests => "Too many requests, please try again later",
            ErrorKind::SystemError => "Internal server error",
            ErrorKind::DefaultError => "An unexpected error occurred",
            ErrorKind::NetworkError => "Unable to reach the upstream service",
        }
    }

    /// Looks up an upstream HTTP status in the fixed table.
    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(ErrorKind::BadRequest),
            401 => Some(ErrorKind::Unauthorized),
            403 => Some(ErrorKind::Forbidden),
            404 => Some(ErrorKind::NotFound),
            422 => Some(ErrorKind::UnprocessableEntity),
            429 => Some(ErrorKind::TooManyRequests),
            500 => Some(ErrorKind::SystemError),
            _ => None,
        }
    }
}

/// Normalized failure returned to clients. Never carries data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ErrorEnvelope {
    pub kind: ErrorKind,
    pub code: u16,
    pub message: String,
}

impl ErrorEnvelope {
    /// Envelope with the kind's canonical code and message.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            code: kind.code(),
            message: kind.default_message().to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Rebuilds an envelope from its wire fields.
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        let kind = match code {
            408 => ErrorKind::TimeoutError,
            503 => ErrorKind::NetworkError,
            other => ErrorKind::from_status(other).unwrap_or(ErrorKind::DefaultError),
        };
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }
}

/// How an upstream call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpstreamFailure<'a> {
    /// A response arrived with a non-success status.
    Status { status: u16, body: Option<&'a str> },
    /// The call exceeded its deadline or was aborted.
    Timeout,
    /// No response could be obtained.
    Network,
}

/// Maps any upstream failure to its envelope.
pub fn map_failure(failure: UpstreamFailure<'_>) -> ErrorEnvelope {
    match failure {
        UpstreamFailure::Status { status, body } => map_status(status, body),
        UpstreamFailure::Timeout => ErrorEnvelope::new(ErrorKind::TimeoutError),
        UpstreamFailure::Network => ErrorEnvelope::new(ErrorKind::NetworkError),
    }
}

/// Maps an upstream status and optional body to an envelope.
///
/// Unmapped statuses produce [`ErrorKind::DefaultError`] with the original
/// status kept as `code`. A `message` in a JSON body replaces the message.
pub fn map_status(status: u16, body: Option<&str>) -> ErrorEnvelope {
    let envelope = match ErrorKind::from_status(status) {
        Some(kind) => ErrorEnvelope::new(kind),
        None => ErrorEnvelope {
            code: status,
            ..ErrorEnvelope::new(ErrorKind::DefaultError)
        },
    };

    match body.and_then(message_override) {
        Some(message) => envelope.with_message(message),
        None => envelope,
    }
}

fn message_override(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_status_maps_to_a_failure() {
        for status in [400, 401, 403, 404, 422, 429, 500, 999] {
            let envelope = map_status(status, None);
            assert_eq!(envelope.code, status);
            assert!(!envelope.message.is_empty());
        }
    }

    #[test]
    fn unmapped_status_keeps_its_code() {
        let envelope = map_status(999, None);

        assert_eq!(envelope.kind, ErrorKind::DefaultError);
        assert_eq!(envelope.code, 999);
        assert_eq!(
            envelope.message,
            ErrorKind::DefaultError.default_message()
        );
    }

    #[test]
    fn body_message_overrides_only_the_message() {
        let envelope = map_status(422, Some(r#"{"message":"Latin name is required"}"#));

        assert_eq!(envelope.kind, ErrorKind::UnprocessableEntity);
        assert_eq!(envelope.code, 422);
        assert_eq!(envelope.message, "Latin name is required");
    }

    #[test]
    fn unusable_bodies_are_ignored() {
        for body in ["not json", r#"{"message": 12}"#, r#"{"message": "  "}"#, "[]", ""] {
            let envelope = map_status(404, Some(body));
            assert_eq!(envelope.message, ErrorKind::NotFound.default_message());
        }
    }

    #[test]
    fn local_failures_skip_the_status_table() {
        let timeout = map_failure(UpstreamFailure::Timeout);
        assert_eq!((timeout.kind, timeout.code), (ErrorKind::TimeoutError, 408));

        let network = map_failure(UpstreamFailure::Network);
        assert_eq!((network.kind, network.code), (ErrorKind::NetworkError, 503));
    }

    #[test]
    fn from_code_recovers_kind() {
        assert_eq!(ErrorEnvelope::from_code(408, "x").kind, ErrorKind::TimeoutError);
        assert_eq!(ErrorEnvelope::from_code(403, "x").kind, ErrorKind::Forbidden);
        assert_eq!(ErrorEnvelope::from_code(418, "x").kind, ErrorKind::DefaultError);
    }
}
