//! Cash-on-delivery settlement.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::checkout::{
    errors::CheckoutFailure,
    models::CheckoutOrderDraft,
    orders::OrdersService,
    settlement::{Attempt, Settlement, SettlementStrategy},
};

/// Submits the draft straight to the order endpoint.
pub struct CodSettlement {
    orders: Arc<dyn OrdersService>,
}

impl std::fmt::Debug for CodSettlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodSettlement").finish_non_exhaustive()
    }
}

impl CodSettlement {
    #[must_use]
    pub fn new(orders: Arc<dyn OrdersService>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl SettlementStrategy for CodSettlement {
    async fn settle(
        &self,
        draft: &CheckoutOrderDraft,
        attempt: &Attempt,
    ) -> Result<Settlement, CheckoutFailure> {
        let message = self
            .orders
            .create_cod_order(draft)
            .await
            .map_err(CheckoutFailure::Backend)?;

        info!(
            attempt = attempt.generation(),
            key = %draft.idempotency_key,
            "cash-on-delivery order placed"
        );

        Ok(Settlement {
            message,
            payment_id: None,
        })
    }
}
