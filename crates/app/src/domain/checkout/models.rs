//! Checkout Models

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    carts::models::{CartView, LineId},
    products::models::ProductId,
};

/// Fields of the shipping form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Name,
    Phone,
    Address,
    City,
    Pincode,
}

impl AddressField {
    /// All fields, in form order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::Pincode,
    ];

    /// Label shown next to the input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "full name",
            Self::Phone => "phone number",
            Self::Address => "address",
            Self::City => "city",
            Self::Pincode => "pincode",
        }
    }
}

impl Display for AddressField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

/// Shipping and billing details; every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
}

impl ShippingAddress {
    /// Value of a single field.
    #[must_use]
    pub fn field(&self, field: AddressField) -> &str {
        match field {
            AddressField::Name => &self.name,
            AddressField::Phone => &self.phone,
            AddressField::Address => &self.address,
            AddressField::City => &self.city,
            AddressField::Pincode => &self.pincode,
        }
    }

    /// First field that is empty or whitespace only.
    #[must_use]
    pub fn first_missing(&self) -> Option<AddressField> {
        AddressField::ALL
            .into_iter()
            .find(|field| self.field(*field).trim().is_empty())
    }
}

/// How the order will be paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    #[serde(rename = "COD")]
    Cod,

    /// Hosted payment gateway.
    #[serde(rename = "ONLINE")]
    Online,
}

/// Which lines a checkout covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutSelection {
    /// Every line in the cart.
    #[default]
    Cart,

    /// A single line ("buy now").
    Single(LineId),
}

/// Submitted checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub shipping: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub selection: CheckoutSelection,
}

/// One frozen order line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    pub product_id: ProductId,
    pub quantity: u32,

    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

/// Order contents frozen when checkout starts.
///
/// Amounts are copied from the cart view, not recomputed, so later cart
/// changes cannot alter what is charged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrderDraft {
    /// Per-attempt key the backend dedupes order creation on.
    #[serde(skip)]
    pub idempotency_key: Uuid,

    pub products: Vec<DraftLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,

    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CheckoutOrderDraft {
    /// Freeze `view` into a draft for a new attempt.
    #[must_use]
    pub fn freeze(
        view: &CartView,
        shipping: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            idempotency_key: Uuid::now_v7(),
            products: view
                .items
                .iter()
                .map(|item| DraftLine {
                    product_id: item.product.id.clone(),
                    quantity: item.quantity,
                    unit_price: item.product.selling,
                })
                .collect(),
            shipping_address: shipping,
            payment_method,
            subtotal: view.subtotal,
            tax: view.tax,
            total: view.total,
        }
    }
}
