//! HTTP surface of the proxy.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, web};
use serde::Serialize;

use crate::domain::envelope::ResponseEnvelope;

pub mod api;

/// Responds with the envelope as JSON, using its `code` as HTTP status.
///
/// Codes outside the valid HTTP range fall back to 500 on the status line;
/// the body still carries the original code.
pub fn envelope_response<T: Serialize>(envelope: &ResponseEnvelope<T>) -> HttpResponse {
    let status =
        StatusCode::from_u16(envelope.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(envelope)
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ResponseEnvelope::ok("up", "Service is healthy"))
}

/// Registers the resource routes under the current scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(api::search)
            .service(api::create)
            .service(api::update)
            .service(api::show)
            .service(api::delete),
    );
}
