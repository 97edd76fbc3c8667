//! Test Fixtures

use std::sync::{Arc, Mutex};

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    domain::{
        carts::{
            LocalCartStore,
            models::{CartLineItem, CartView, LineId},
            remote::{MockRemoteCartService, RemoteCartLine},
            storage::MemorySlot,
        },
        checkout::{
            models::{CheckoutOrderDraft, PaymentMethod, ShippingAddress},
            orders::GatewayOrder,
            settlement::gateway::PaymentCallback,
        },
        products::models::{ProductId, ProductSnapshot},
        session::models::UserSession,
    },
    notifications::{Notification, Notifier},
};

pub(crate) fn product(id: &str, selling: i64) -> ProductSnapshot {
    let mut chars = id.chars();
    let name = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();

    ProductSnapshot {
        id: ProductId::from(id),
        name,
        brand: "Acme".to_string(),
        category: "kitchen".to_string(),
        images: vec![format!("https://img.example.test/{id}.png")],
        price: Decimal::from(selling + 20),
        selling: Decimal::from(selling),
    }
}

pub(crate) fn line(id: &str, selling: i64, quantity: u32) -> CartLineItem {
    CartLineItem {
        id: LineId::from(id),
        product: product(id, selling),
        quantity,
    }
}

pub(crate) fn remote_line(
    line_id: &str,
    product_id: &str,
    selling: i64,
    quantity: u32,
) -> RemoteCartLine {
    RemoteCartLine {
        id: LineId::from(line_id),
        product: Some(product(product_id, selling)),
        quantity,
    }
}

pub(crate) fn user() -> UserSession {
    UserSession {
        id: "user-1".to_string(),
        name: "Asha Rao".to_string(),
        email: "asha@example.test".to_string(),
        role: Some("GENERAL".to_string()),
    }
}

pub(crate) fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Asha Rao".to_string(),
        phone: "9876543210".to_string(),
        address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        pincode: "560001".to_string(),
    }
}

/// Cash-on-delivery draft for `quantity` kettles at `selling` each.
pub(crate) fn draft(selling: i64, quantity: u32) -> CheckoutOrderDraft {
    let view = CartView::from_items(vec![line("kettle", selling, quantity)]);

    CheckoutOrderDraft::freeze(&view, address(), PaymentMethod::Cod)
}

pub(crate) fn gateway_order(amount: Decimal) -> GatewayOrder {
    GatewayOrder {
        id: "order_1".to_string(),
        amount: (amount * Decimal::ONE_HUNDRED).to_u64().unwrap_or_default(),
        currency: "INR".to_string(),
    }
}

pub(crate) fn callback(payment_id: &str) -> PaymentCallback {
    PaymentCallback {
        razorpay_payment_id: Some(payment_id.to_string()),
        razorpay_order_id: Some("order_1".to_string()),
        razorpay_signature: Some("sig_1".to_string()),
    }
}

pub(crate) fn memory_store() -> LocalCartStore {
    LocalCartStore::new(Arc::new(MemorySlot::default()))
}

/// Remote cart that fails the test if it is called at all.
pub(crate) fn strict_remote() -> MockRemoteCartService {
    let mut remote = MockRemoteCartService::new();

    remote.expect_list().never();
    remote.expect_add().never();
    remote.expect_update_quantity().never();
    remote.expect_remove().never();
    remote.expect_count().never();

    remote
}

/// Notifier that keeps everything it is given.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|notification| notification.message)
            .collect()
    }

    pub(crate) fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}
