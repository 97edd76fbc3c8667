//! Product Models

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Backend product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Denormalised product data captured when a line enters the cart.
///
/// Field names follow the backend document so snapshots round-trip through
/// both the API and the guest cart slot unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    #[serde(rename = "_id")]
    pub id: ProductId,

    #[serde(rename = "productName", default)]
    pub name: String,

    #[serde(rename = "brandName", default)]
    pub brand: String,

    #[serde(default)]
    pub category: String,

    #[serde(rename = "productImage", default)]
    pub images: Vec<String>,

    /// List price.
    #[serde(default)]
    pub price: Decimal,

    /// Discounted price actually charged.
    pub selling: Decimal,
}

impl ProductSnapshot {
    /// Primary image reference.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn decodes_backend_document_with_numeric_prices() -> TestResult {
        let product: ProductSnapshot = serde_json::from_value(json!({
            "_id": "p1",
            "productName": "Kettle",
            "brandName": "Acme",
            "category": "kitchen",
            "productImage": ["https://img/kettle.png"],
            "price": 1299,
            "selling": 999.5,
            "description": "ignored"
        }))?;

        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.selling, Decimal::new(9995, 1));
        assert_eq!(product.image(), Some("https://img/kettle.png"));

        Ok(())
    }

    #[test]
    fn missing_selling_price_is_rejected() {
        let result = serde_json::from_value::<ProductSnapshot>(json!({ "_id": "p1" }));

        assert!(result.is_err(), "a snapshot without a selling price is unusable");
    }
}
