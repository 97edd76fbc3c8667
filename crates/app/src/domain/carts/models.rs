//! Cart Models

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    carts::totals,
    products::models::{ProductId, ProductSnapshot},
};

/// Identifier used to address a cart line.
///
/// Guest lines are addressed by their product id; server lines by the id the
/// backend assigned to the line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LineId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LineId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&ProductId> for LineId {
    fn from(value: &ProductId) -> Self {
        Self(value.as_str().to_string())
    }
}

/// CartLineItem Model
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub id: LineId,
    pub product: ProductSnapshot,

    /// Always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// Selling price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .selling
            .saturating_mul(Decimal::from(self.quantity))
    }
}

/// Derived cart contents and charges, recomputed on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartView {
    /// Build the view for the given lines, preserving their order.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let subtotal = items
            .iter()
            .map(CartLineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add);

        Self {
            tax: totals::tax(subtotal),
            total: totals::total(subtotal),
            subtotal,
            items,
        }
    }

    /// A view with no lines.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Find a line by id.
    #[must_use]
    pub fn line(&self, id: &LineId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}
