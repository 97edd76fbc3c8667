//! Checkout Config

use std::time::Duration;

use clap::Args;

use crate::domain::checkout::settlement::GatewaySettings;

/// Checkout and payment gateway settings.
#[derive(Debug, Clone, Args)]
pub struct CheckoutConfig {
    /// Publishable payment gateway key
    #[arg(long, env = "RAZORPAY_KEY_ID")]
    pub gateway_key: Option<String>,

    /// Merchant name shown in the hosted payment UI
    #[arg(long, env = "STOREFRONT_MERCHANT_NAME", default_value = "Storefront")]
    pub merchant_name: String,

    /// Delay before returning home after a settled order, in milliseconds
    #[arg(long, env = "STOREFRONT_REDIRECT_DELAY_MS", default_value_t = 1_500_u64)]
    pub redirect_delay_ms: u64,
}

impl CheckoutConfig {
    #[must_use]
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Settings for the hosted payment strategy.
    #[must_use]
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            key: self.gateway_key.clone(),
            merchant_name: self.merchant_name.clone(),
            ..GatewaySettings::default()
        }
    }
}
