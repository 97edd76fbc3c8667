//! Carts

pub mod errors;
pub mod local;
pub mod models;
pub mod remote;
pub mod service;
pub mod storage;
pub mod totals;

pub use errors::{CartError, StorageError};
pub use local::{AddOutcome, LocalCartStore};
pub use remote::{HttpRemoteCart, RemoteCartService, RemoteFailure};
pub use service::*;
