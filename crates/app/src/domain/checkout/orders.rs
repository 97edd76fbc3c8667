//! Order endpoints.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::checkout::models::{CheckoutOrderDraft, DraftLine, ShippingAddress},
    http::{BackendClient, BackendError, Endpoint},
};

/// Order token issued by the backend for a hosted payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id.
    pub id: String,

    /// Amount in the gateway's minor unit.
    pub amount: u64,

    pub currency: String,
}

/// Complete success callback from the hosted payment UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

#[derive(Debug, Serialize)]
struct VerifyPaymentRequest<'a> {
    razorpay_order_id: &'a str,
    razorpay_payment_id: &'a str,
    razorpay_signature: &'a str,

    #[serde(rename = "orderData")]
    order_data: &'a CheckoutOrderDraft,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CodOrderRequest<'a> {
    products: &'a [DraftLine],
    shipping_address: &'a ShippingAddress,

    #[serde(with = "rust_decimal::serde::float")]
    subtotal: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    tax: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
}

impl<'a> From<&'a CheckoutOrderDraft> for CodOrderRequest<'a> {
    fn from(draft: &'a CheckoutOrderDraft) -> Self {
        Self {
            products: &draft.products,
            shipping_address: &draft.shipping_address,
            subtotal: draft.subtotal,
            tax: draft.tax,
            total: draft.total,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpOrdersService {
    client: BackendClient,
}

impl HttpOrdersService {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrdersService for HttpOrdersService {
    async fn create_cod_order(
        &self,
        draft: &CheckoutOrderDraft,
    ) -> Result<Option<String>, BackendError> {
        self.client
            .post::<_, serde_json::Value>(
                Endpoint::CreateCodOrder,
                &CodOrderRequest::from(draft),
                Some(draft.idempotency_key),
            )
            .await?
            .into_message()
    }

    async fn create_gateway_order(
        &self,
        amount: Decimal,
        idempotency_key: Uuid,
    ) -> Result<GatewayOrder, BackendError> {
        self.client
            .post(
                Endpoint::CreateOrder,
                &CreateOrderRequest { amount },
                Some(idempotency_key),
            )
            .await?
            .into_data()
    }

    async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
        draft: &CheckoutOrderDraft,
    ) -> Result<Option<String>, BackendError> {
        self.client
            .post::<_, serde_json::Value>(
                Endpoint::VerifyPayment,
                &VerifyPaymentRequest {
                    razorpay_order_id: &confirmation.order_id,
                    razorpay_payment_id: &confirmation.payment_id,
                    razorpay_signature: &confirmation.signature,
                    order_data: draft,
                },
                Some(draft.idempotency_key),
            )
            .await?
            .into_message()
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Place a cash-on-delivery order.
    async fn create_cod_order(
        &self,
        draft: &CheckoutOrderDraft,
    ) -> Result<Option<String>, BackendError>;

    /// Request a hosted-payment order token for `amount`.
    async fn create_gateway_order(
        &self,
        amount: Decimal,
        idempotency_key: Uuid,
    ) -> Result<GatewayOrder, BackendError>;

    /// Forward a gateway success callback for signature verification.
    async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
        draft: &CheckoutOrderDraft,
    ) -> Result<Option<String>, BackendError>;
}
