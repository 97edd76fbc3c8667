//! Hosted payment gateway settlement.

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::domain::checkout::{
    errors::CheckoutFailure,
    models::CheckoutOrderDraft,
    orders::{GatewayOrder, OrdersService, PaymentConfirmation},
    settlement::{Attempt, Settlement, SettlementStrategy},
};

const PLACEHOLDER_MARKERS: [&str; 4] = ["xxxx", "your_key", "placeholder", "changeme"];

/// Rejected publishable gateway key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayKeyError {
    #[error("gateway key is not set")]
    Missing,

    #[error("gateway key looks like a placeholder")]
    Placeholder,
}

/// Accept `key` only if it is set and is not an obvious placeholder.
pub fn validate_gateway_key(key: Option<&str>) -> Result<&str, GatewayKeyError> {
    let key = key.map(str::trim).unwrap_or_default();

    if key.is_empty() {
        return Err(GatewayKeyError::Missing);
    }

    let lowered = key.to_ascii_lowercase();

    if PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return Err(GatewayKeyError::Placeholder);
    }

    Ok(key)
}

/// Success payload as delivered by the hosted UI.
///
/// Fields are optional because the UI has been seen to omit them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentCallback {
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

impl PaymentCallback {
    /// Require all three fields to be present and non-blank.
    pub fn confirm(self) -> Result<PaymentConfirmation, CheckoutFailure> {
        fn required(
            value: Option<String>,
            name: &'static str,
        ) -> Result<String, CheckoutFailure> {
            value
                .filter(|value| !value.trim().is_empty())
                .ok_or(CheckoutFailure::IncompleteCallback(name))
        }

        Ok(PaymentConfirmation {
            payment_id: required(self.razorpay_payment_id, "razorpay_payment_id")?,
            order_id: required(self.razorpay_order_id, "razorpay_order_id")?,
            signature: required(self.razorpay_signature, "razorpay_signature")?,
        })
    }
}

/// Outcome reported by the hosted UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Succeeded(PaymentCallback),
    Failed { description: Option<String> },
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prefill {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentNotes {
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalOptions {
    pub confirm_close: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryOptions {
    pub enabled: bool,
    pub max_count: u32,
}

/// Options handed to the hosted payment UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedPaymentOptions {
    pub key: String,
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: Prefill,
    pub notes: PaymentNotes,
    pub theme: Theme,
    pub modal: ModalOptions,
    pub retry: RetryOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostedPaymentError(pub String);

/// The gateway's hosted checkout UI.
///
/// `open` must report at most one event on `events`; the settlement ignores
/// anything after the first.
#[automock]
pub trait HostedPayment: Send + Sync {
    /// Whether the UI runtime has been loaded.
    fn is_loaded(&self) -> bool;

    fn open(
        &self,
        options: HostedPaymentOptions,
        events: mpsc::UnboundedSender<GatewayEvent>,
    ) -> Result<(), HostedPaymentError>;
}

/// Hosted payment for environments without a UI runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableHostedPayment;

impl HostedPayment for UnavailableHostedPayment {
    fn is_loaded(&self) -> bool {
        false
    }

    fn open(
        &self,
        _options: HostedPaymentOptions,
        _events: mpsc::UnboundedSender<GatewayEvent>,
    ) -> Result<(), HostedPaymentError> {
        Err(HostedPaymentError("hosted payment runtime not loaded".to_string()))
    }
}

/// Static gateway settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Publishable key; validated on every attempt.
    pub key: Option<String>,
    pub merchant_name: String,
    pub theme_color: String,
    pub retry_limit: u32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            key: None,
            merchant_name: "Storefront".to_string(),
            theme_color: "#ef4444".to_string(),
            retry_limit: 4,
        }
    }
}

/// Number of recently forwarded payment ids remembered for dedupe.
const VERIFIED_PAYMENTS_RETAINED: usize = 32;

/// Payment ids already forwarded for verification, oldest evicted first.
#[derive(Debug, Default)]
struct VerifiedPayments {
    ids: FxHashSet<String>,
    order: VecDeque<String>,
}

impl VerifiedPayments {
    /// Record `id`, returning false when it was already recorded.
    fn record(&mut self, id: &str) -> bool {
        if !self.ids.insert(id.to_string()) {
            return false;
        }

        self.order.push_back(id.to_string());

        while self.order.len() > VERIFIED_PAYMENTS_RETAINED {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }

        true
    }
}

/// Order token, hosted UI, then backend signature verification.
pub struct GatewaySettlement {
    orders: Arc<dyn OrdersService>,
    hosted: Arc<dyn HostedPayment>,
    settings: GatewaySettings,
    verified: Mutex<VerifiedPayments>,
}

impl std::fmt::Debug for GatewaySettlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettlement")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl GatewaySettlement {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersService>,
        hosted: Arc<dyn HostedPayment>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            orders,
            hosted,
            settings,
            verified: Mutex::default(),
        }
    }

    fn options(
        &self,
        key: &str,
        order: &GatewayOrder,
        draft: &CheckoutOrderDraft,
    ) -> HostedPaymentOptions {
        let shipping = &draft.shipping_address;

        HostedPaymentOptions {
            key: key.to_string(),
            amount: order.amount,
            currency: order.currency.clone(),
            name: self.settings.merchant_name.clone(),
            description: format!("Order of {} item(s)", draft.products.len()),
            order_id: order.id.clone(),
            prefill: Prefill {
                name: shipping.name.clone(),
                contact: shipping.phone.clone(),
            },
            notes: PaymentNotes {
                address: shipping.address.clone(),
                city: shipping.city.clone(),
            },
            theme: Theme {
                color: self.settings.theme_color.clone(),
            },
            modal: ModalOptions {
                confirm_close: true,
            },
            retry: RetryOptions {
                enabled: self.settings.retry_limit > 0,
                max_count: self.settings.retry_limit,
            },
        }
    }

    async fn verify(
        &self,
        callback: PaymentCallback,
        draft: &CheckoutOrderDraft,
    ) -> Result<Settlement, CheckoutFailure> {
        let confirmation = callback.confirm()?;

        if !self.verified.lock().await.record(&confirmation.payment_id) {
            warn!(payment = %confirmation.payment_id, "payment already sent for verification");

            return Err(CheckoutFailure::AlreadyVerified(confirmation.payment_id));
        }

        let message = self
            .orders
            .verify_payment(&confirmation, draft)
            .await
            .map_err(CheckoutFailure::Verification)?;

        info!(payment = %confirmation.payment_id, "payment verified");

        Ok(Settlement {
            message,
            payment_id: Some(confirmation.payment_id),
        })
    }
}

#[async_trait]
impl SettlementStrategy for GatewaySettlement {
    async fn settle(
        &self,
        draft: &CheckoutOrderDraft,
        attempt: &Attempt,
    ) -> Result<Settlement, CheckoutFailure> {
        let order = self
            .orders
            .create_gateway_order(draft.total, draft.idempotency_key)
            .await
            .map_err(CheckoutFailure::Backend)?;

        debug!(order = %order.id, amount = order.amount, "gateway order created");

        if !self.hosted.is_loaded() {
            return Err(CheckoutFailure::GatewayUnavailable);
        }

        let key = validate_gateway_key(self.settings.key.as_deref())
            .map_err(CheckoutFailure::GatewayMisconfigured)?;

        let (events, mut outcomes) = mpsc::unbounded_channel();

        self.hosted
            .open(self.options(key, &order, draft), events)
            .map_err(|error| CheckoutFailure::GatewayOpen(error.0))?;

        let Some(event) = outcomes.recv().await else {
            return Err(CheckoutFailure::Interrupted);
        };

        outcomes.close();

        while let Ok(late) = outcomes.try_recv() {
            warn!(?late, "ignoring gateway event after the first outcome");
        }

        if !attempt.is_current() {
            debug!(
                attempt = attempt.generation(),
                "gateway outcome arrived for a superseded attempt"
            );

            return Err(CheckoutFailure::Superseded);
        }

        match event {
            GatewayEvent::Succeeded(callback) => self.verify(callback, draft).await,
            GatewayEvent::Failed { description } => Err(CheckoutFailure::PaymentFailed {
                description: description.unwrap_or_else(|| "Unknown error".to_string()),
            }),
            GatewayEvent::Dismissed => Err(CheckoutFailure::Cancelled),
        }
    }
}
