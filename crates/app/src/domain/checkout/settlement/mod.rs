//! Settlement strategies.
//!
//! A strategy turns a frozen draft into a confirmed order, or explains why it
//! could not.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use mockall::automock;

use crate::domain::checkout::{errors::CheckoutFailure, models::CheckoutOrderDraft};

pub mod cod;
pub mod gateway;

pub use cod::CodSettlement;
pub use gateway::{GatewaySettings, GatewaySettlement};

/// Confirmed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Backend confirmation message.
    pub message: Option<String>,

    /// Gateway payment id, for hosted payments.
    pub payment_id: Option<String>,
}

/// Generation counter shared by a checkout flow and its attempts.
#[derive(Debug, Clone, Default)]
pub struct AttemptCounter(Arc<AtomicU64>);

impl AttemptCounter {
    /// Start a new attempt, superseding any earlier one.
    pub fn begin(&self) -> Attempt {
        let generation = self.0.fetch_add(1, Ordering::AcqRel) + 1;

        Attempt {
            generation,
            current: self.0.clone(),
        }
    }

    /// Supersede the running attempt without starting a new one.
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

/// Handle for one checkout attempt.
#[derive(Debug, Clone)]
pub struct Attempt {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl Attempt {
    /// This attempt's generation number.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer attempt has started and the flow is still waiting on
    /// this one.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }
}

#[automock]
#[async_trait]
pub trait SettlementStrategy: Send + Sync {
    /// Settle `draft`. Only a confirmed backend success returns `Ok`.
    async fn settle(
        &self,
        draft: &CheckoutOrderDraft,
        attempt: &Attempt,
    ) -> Result<Settlement, CheckoutFailure>;
}
