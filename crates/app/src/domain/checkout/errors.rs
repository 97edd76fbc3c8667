//! Checkout errors.

use thiserror::Error;

use crate::{
    domain::{
        carts::{errors::CartError, models::LineId},
        checkout::{models::AddressField, settlement::gateway::GatewayKeyError},
    },
    http::BackendError,
};

/// Problems caught before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing {0}")]
    MissingField(AddressField),

    #[error("cart is empty")]
    EmptyCart,

    #[error("cart line {0} is not in the cart")]
    UnknownItem(LineId),
}

impl ValidationError {
    /// Text suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Please fill in your {field}"),
            Self::EmptyCart => "Your cart is empty!".to_string(),
            Self::UnknownItem(_) => "That item is no longer in your cart".to_string(),
        }
    }
}

/// How a failed attempt should be presented and whether retrying can help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network or backend refusal; the user can resubmit.
    Transient,

    /// Deployment problem; the user cannot fix it.
    Configuration,

    /// Declined or cancelled in the gateway; another instrument may work.
    Payment,

    /// Payment could not be proven; never retried or assumed successful.
    Verification,
}

/// Why a submitted checkout attempt failed.
#[derive(Debug, Error)]
pub enum CheckoutFailure {
    #[error("cart could not be loaded")]
    Cart(#[source] CartError),

    #[error("order request failed")]
    Backend(#[source] BackendError),

    #[error("payment gateway is not loaded")]
    GatewayUnavailable,

    #[error("payment gateway could not be opened: {0}")]
    GatewayOpen(String),

    #[error("payment gateway is misconfigured")]
    GatewayMisconfigured(#[source] GatewayKeyError),

    #[error("payment failed: {description}")]
    PaymentFailed { description: String },

    #[error("payment cancelled by user")]
    Cancelled,

    #[error("payment window closed without reporting an outcome")]
    Interrupted,

    #[error("payment callback is missing {0}")]
    IncompleteCallback(&'static str),

    #[error("payment {0} was already submitted for verification")]
    AlreadyVerified(String),

    #[error("payment verification failed")]
    Verification(#[source] BackendError),

    #[error("checkout attempt was superseded")]
    Superseded,
}

impl CheckoutFailure {
    /// Taxonomy bucket for this failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Cart(_) | Self::Backend(_) | Self::Superseded => FailureKind::Transient,
            Self::GatewayUnavailable | Self::GatewayOpen(_) | Self::GatewayMisconfigured(_) => {
                FailureKind::Configuration
            }
            Self::PaymentFailed { .. } | Self::Cancelled | Self::Interrupted => FailureKind::Payment,
            Self::IncompleteCallback(_) | Self::AlreadyVerified(_) | Self::Verification(_) => {
                FailureKind::Verification
            }
        }
    }

    /// Text suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Cart(error) => error.user_message(),
            Self::Backend(error) => error.user_message(),
            Self::GatewayUnavailable | Self::GatewayOpen(_) => {
                "Payment gateway unavailable. Please try again later or choose Cash on Delivery."
                    .to_string()
            }
            Self::GatewayMisconfigured(_) => {
                "Online payment is not configured. Please contact support.".to_string()
            }
            Self::PaymentFailed { description } => format!("Payment failed: {description}"),
            Self::Cancelled => "Payment cancelled".to_string(),
            Self::Interrupted => "Payment window closed unexpectedly".to_string(),
            Self::IncompleteCallback(_) | Self::AlreadyVerified(_) => {
                "Payment verification failed".to_string()
            }
            Self::Verification(error) => error
                .message()
                .unwrap_or("Payment verification failed")
                .to_string(),
            Self::Superseded => "Checkout was restarted".to_string(),
        }
    }
}
