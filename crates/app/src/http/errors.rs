//! Backend errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Shown when the backend gives no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// An HTTP transport or body decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend returned status {status}")]
    Status {
        /// Response status.
        status: StatusCode,

        /// Message from the error body, when it had one.
        message: Option<String>,
    },

    /// The backend answered `success: false`.
    #[error("backend rejected the request")]
    Unsuccessful {
        /// Message from the response body.
        message: Option<String>,
    },

    /// The body did not have the expected shape.
    #[error("unexpected response from backend: {0}")]
    Malformed(String),

    /// The configured session credential cannot be sent as a header.
    #[error("session token contains characters not allowed in a cookie")]
    InvalidCredential,
}

impl BackendError {
    /// Message supplied by the backend, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Unsuccessful { message } => message
                .as_deref()
                .map(str::trim)
                .filter(|message| !message.is_empty()),
            Self::Http(_) | Self::Malformed(_) | Self::InvalidCredential => None,
        }
    }

    /// Text suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.message().unwrap_or(GENERIC_FAILURE_MESSAGE).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_backend_text() {
        let error = BackendError::Unsuccessful {
            message: Some("Out of stock".to_string()),
        };

        assert_eq!(error.user_message(), "Out of stock");
    }

    #[test]
    fn user_message_falls_back_to_generic() {
        let blank = BackendError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: Some("   ".to_string()),
        };

        assert_eq!(blank.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            BackendError::Malformed("bad".to_string()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
    }
}
