//! Error conversion glue between the transport, the taxonomy and actix-web.
//!
//! The taxonomy in [`crate::errors`] is usable with only the `data` feature;
//! the conversions that need server-side types live here.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::envelope::ResponseEnvelope;
use crate::errors::{ErrorEnvelope, UpstreamFailure, map_failure};
use crate::proxy::TransportError;
use crate::routes::envelope_response;

impl From<TransportError> for ErrorEnvelope {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => map_failure(UpstreamFailure::Timeout),
            TransportError::Network(_) => map_failure(UpstreamFailure::Network),
        }
    }
}

impl ResponseError for ErrorEnvelope {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        envelope_response(&ResponseEnvelope::<()>::failure(self.clone()))
    }
}
