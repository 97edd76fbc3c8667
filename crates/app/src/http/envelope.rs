//! Response envelope shared by every backend endpoint.

use serde::Deserialize;

use crate::http::BackendError;

/// `{success, error, message, data}` wrapper returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend accepted the request.
    #[serde(default)]
    pub success: bool,

    /// Set by some endpoints alongside `success: false`.
    #[serde(default)]
    pub error: bool,

    /// Human-readable message, present on most responses.
    #[serde(default)]
    pub message: Option<String>,

    /// Payload for read endpoints.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unsuccessful`] when `success` is false and
    /// [`BackendError::Malformed`] when a successful response carries no data.
    pub fn into_data(self) -> Result<T, BackendError> {
        if !self.success {
            return Err(BackendError::Unsuccessful {
                message: self.message,
            });
        }

        self.data
            .ok_or_else(|| BackendError::Malformed("response is missing `data`".to_string()))
    }

    /// Acknowledge a successful mutation, returning its message.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unsuccessful`] when `success` is false.
    pub fn into_message(self) -> Result<Option<String>, BackendError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(BackendError::Unsuccessful {
                message: self.message,
            })
        }
    }
}
