//! Bearer-token access for upstream calls.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest};

/// Read-only source of the caller's bearer token.
pub trait TokenProvider {
    fn bearer_token(&self) -> Option<String>;
}

/// No credentials at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct Anonymous;

impl TokenProvider for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

impl TokenProvider for Option<String> {
    fn bearer_token(&self) -> Option<String> {
        self.clone()
    }
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String>,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}

/// Token taken from the incoming request's `Authorization` header.
///
/// Extraction never fails; a missing or malformed header yields `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn from_header(value: &str) -> Self {
        let token = value
            .trim()
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        Self(token)
    }
}

impl TokenProvider for BearerToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl FromRequest for BearerToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(BearerToken::from_header)
            .unwrap_or_default();
        ready(Ok(token))
    }
}
