//! Checkout

pub mod controller;
pub mod errors;
pub mod models;
pub mod orders;
pub mod settlement;
pub mod validation;

pub use controller::*;
pub use errors::{CheckoutFailure, FailureKind, ValidationError};
pub use orders::{HttpOrdersService, OrdersService};
