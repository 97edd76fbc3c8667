//! Backend HTTP plumbing.

mod client;
mod endpoints;
mod envelope;
mod errors;

pub use client::{BackendClient, BackendSettings};
pub use endpoints::Endpoint;
pub use envelope::ApiResponse;
pub use errors::{BackendError, GENERIC_FAILURE_MESSAGE};
