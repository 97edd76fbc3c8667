//! Storefront configuration module

use clap::Parser;

use crate::config::{
    backend::BackendConfig, checkout::CheckoutConfig, observability::LoggingConfig,
    storage::StorageConfig,
};

pub mod backend;
pub mod checkout;
pub mod observability;
pub mod storage;

pub use observability::LogFormat;

/// Storefront client configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "storefront", about = "Storefront cart and checkout client", long_about = None)]
pub struct StorefrontConfig {
    /// Backend connection settings.
    #[command(flatten)]
    pub backend: BackendConfig,

    /// Guest cart persistence settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Checkout and payment gateway settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
