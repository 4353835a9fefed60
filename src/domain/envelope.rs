use serde::{Deserialize, Serialize};

use crate::errors::ErrorEnvelope;

/// Uniform `{success, code, message, data?}` wrapper around every response.
///
/// `data` is present exactly when `success` is true.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope<T> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: 200,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(error: ErrorEnvelope) -> Self {
        Self {
            success: false,
            code: error.code,
            message: error.message,
            data: None,
        }
    }

    /// Splits the envelope into the payload or the error it describes.
    pub fn into_result(self) -> Result<T, ErrorEnvelope> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ErrorEnvelope::from_code(500, "Response carried no data")),
            (false, _) => Err(ErrorEnvelope::from_code(self.code, self.message)),
        }
    }
}

impl<T> From<ErrorEnvelope> for ResponseEnvelope<T> {
    fn from(error: ErrorEnvelope) -> Self {
        Self::failure(error)
    }
}
