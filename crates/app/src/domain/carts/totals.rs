//! Cart charges.
//!
//! Tax is a flat 5%. The tax line and the total are each rounded on their own,
//! so for fractional subtotals `subtotal + tax` may differ from `total` by one
//! currency unit. That difference is displayed as-is.

use rust_decimal::{Decimal, RoundingStrategy};

/// 5% expressed as a fraction.
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// `1 + TAX_RATE`.
const TAX_MULTIPLIER: Decimal = Decimal::from_parts(105, 0, 0, false, 2);

/// Tax line: `round(subtotal * 0.05)`.
#[must_use]
pub fn tax(subtotal: Decimal) -> Decimal {
    round(subtotal.saturating_mul(TAX_RATE))
}

/// Charged total: `round(subtotal * 1.05)`.
#[must_use]
pub fn total(subtotal: Decimal) -> Decimal {
    round(subtotal.saturating_mul(TAX_MULTIPLIER))
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
