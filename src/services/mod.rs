//! Services coordinating proxied resource workflows.

use crate::errors::ErrorEnvelope;

pub mod resources;

pub type ServiceResult<T> = Result<T, ErrorEnvelope>;
