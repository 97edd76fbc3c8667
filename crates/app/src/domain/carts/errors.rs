//! Cart errors.

use std::io;

use thiserror::Error;

use crate::domain::carts::{models::LineId, remote::RemoteFailure};

/// Errors raised by a persistence slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cart slot i/o error")]
    Io(#[from] io::Error),

    #[error("could not encode cart")]
    Encode(#[from] serde_json::Error),
}

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("local cart could not be saved")]
    Storage(#[from] StorageError),

    #[error("remote cart request failed: {0}")]
    Remote(#[from] RemoteFailure),

    #[error("cart line {0} not found")]
    LineNotFound(LineId),
}

impl CartError {
    /// Text suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) => "Could not save your cart on this device".to_string(),
            Self::Remote(failure) => failure.message.clone(),
            Self::LineNotFound(_) => "That item is no longer in your cart".to_string(),
        }
    }
}
