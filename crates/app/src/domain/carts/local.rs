//! Guest cart kept on this device.
//!
//! Every mutation reads the whole list, changes it and writes the whole list
//! back. There are no partial writes; concurrent writers from other processes
//! are last-write-wins.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{
    carts::{
        errors::StorageError,
        models::{CartLineItem, LineId},
        storage::CartSlot,
    },
    products::models::{ProductId, ProductSnapshot},
};

/// Name of the slot holding the guest cart.
pub const GUEST_CART_SLOT: &str = "cartItems";

/// Current persisted schema version.
const SCHEMA_VERSION: u32 = 1;

/// Result of [`LocalCartStore::add_or_increment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line with quantity 1 was appended.
    Added,

    /// An existing line was bumped to the contained quantity.
    QuantityIncreased(u32),
}

/// Line as written to the slot: the product document with its quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLine {
    #[serde(flatten)]
    product: ProductSnapshot,

    #[serde(default)]
    quantity: u32,
}

impl From<StoredLine> for CartLineItem {
    fn from(line: StoredLine) -> Self {
        Self {
            id: LineId::from(&line.product.id),
            quantity: line.quantity.max(1),
            product: line.product,
        }
    }
}

impl From<&CartLineItem> for StoredLine {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product: item.product.clone(),
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
struct PersistedCart<'a> {
    version: u32,
    items: &'a [StoredLine],
}

/// Durable, synchronous guest cart.
#[derive(Debug)]
pub struct LocalCartStore {
    slot: Arc<dyn CartSlot>,
    write_lock: Mutex<()>,
}

impl LocalCartStore {
    #[must_use]
    pub fn new(slot: Arc<dyn CartSlot>) -> Self {
        Self {
            slot,
            write_lock: Mutex::new(()),
        }
    }

    /// Persisted lines in insertion order.
    ///
    /// Missing, unreadable or invalid data yields an empty cart.
    pub fn load(&self) -> Vec<CartLineItem> {
        let contents = match self.slot.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Vec::new(),
            Err(error) => {
                warn!("guest cart unreadable, treating as empty: {error}");

                return Vec::new();
            }
        };

        decode(&contents)
            .into_iter()
            .map(CartLineItem::from)
            .collect()
    }

    /// Append `product` with quantity 1, or bump its existing line by one.
    ///
    /// # Errors
    ///
    /// Returns an error when the updated list cannot be written.
    pub fn add_or_increment(&self, product: &ProductSnapshot) -> Result<AddOutcome, StorageError> {
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.product.id == product.id) {
                item.quantity = item.quantity.saturating_add(1);

                return AddOutcome::QuantityIncreased(item.quantity);
            }

            items.push(CartLineItem {
                id: LineId::from(&product.id),
                product: product.clone(),
                quantity: 1,
            });

            AddOutcome::Added
        })
    }

    /// Adjust a line's quantity by `delta`, never going below 1.
    ///
    /// Returns the resulting quantity, or `None` when no line matches.
    ///
    /// # Errors
    ///
    /// Returns an error when the updated list cannot be written.
    pub fn update_quantity(
        &self,
        product: &ProductId,
        delta: i64,
    ) -> Result<Option<u32>, StorageError> {
        self.mutate(|items| {
            let item = items.iter_mut().find(|item| &item.product.id == product)?;

            item.quantity = clamp_quantity(item.quantity, delta);

            Some(item.quantity)
        })
    }

    /// Remove the line for `product`. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns an error when the updated list cannot be written.
    pub fn remove(&self, product: &ProductId) -> Result<bool, StorageError> {
        self.mutate(|items| {
            let before = items.len();

            items.retain(|item| &item.product.id != product);

            items.len() != before
        })
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the slot cannot be cleared.
    pub fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.slot.remove()?;

        debug!("guest cart cleared");

        Ok(())
    }

    /// Sum of quantities, for the cart badge.
    pub fn count(&self) -> u64 {
        self.load()
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Vec<CartLineItem>) -> T,
    ) -> Result<T, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut items = self.load();
        let result = change(&mut items);

        self.persist(&items)?;

        Ok(result)
    }

    fn persist(&self, items: &[CartLineItem]) -> Result<(), StorageError> {
        let stored: Vec<StoredLine> = items.iter().map(StoredLine::from).collect();

        let encoded = serde_json::to_string(&PersistedCart {
            version: SCHEMA_VERSION,
            items: &stored,
        })?;

        self.slot.write(&encoded)
    }
}

/// Clamp `current + delta` to `[1, u32::MAX]`.
fn clamp_quantity(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta).max(1);

    u32::try_from(next).unwrap_or(u32::MAX)
}

/// Decode any supported slot layout.
///
/// Versioned envelopes are read when the version is known; a bare array is the
/// pre-versioning layout and is migrated. Anything else is discarded.
fn decode(contents: &str) -> Vec<StoredLine> {
    let value: Value = match serde_json::from_str(contents) {
        Ok(value) => value,
        Err(error) => {
            warn!("guest cart is not valid JSON, discarding: {error}");

            return Vec::new();
        }
    };

    let items = match value {
        Value::Array(_) => {
            debug!("migrating unversioned guest cart");

            value
        }
        Value::Object(mut envelope) => {
            let version = envelope.get("version").and_then(Value::as_u64);

            if version != Some(u64::from(SCHEMA_VERSION)) {
                warn!(?version, "unknown guest cart schema version, discarding");

                return Vec::new();
            }

            envelope.remove("items").unwrap_or(Value::Array(Vec::new()))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            warn!("guest cart has an unexpected shape, discarding");

            return Vec::new();
        }
    };

    serde_json::from_value(items).unwrap_or_else(|error| {
        warn!("guest cart lines are invalid, discarding: {error}");

        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        domain::carts::storage::MemorySlot,
        test::fixtures::{memory_store, product},
    };

    use super::*;

    #[test]
    fn repeated_adds_keep_a_single_line() -> TestResult {
        let store = memory_store();
        let kettle = product("kettle", 100);

        for expected in 1..=5_u32 {
            let outcome = store.add_or_increment(&kettle)?;

            if expected == 1 {
                assert_eq!(outcome, AddOutcome::Added);
            } else {
                assert_eq!(outcome, AddOutcome::QuantityIncreased(expected));
            }
        }

        let items = store.load();

        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|item| item.quantity), Some(5));

        Ok(())
    }

    #[test]
    fn quantity_never_drops_below_one() -> TestResult {
        let store = memory_store();
        let kettle = product("kettle", 100);

        store.add_or_increment(&kettle)?;
        store.add_or_increment(&kettle)?;

        for delta in [-1, -1, -1, -50, i64::MIN] {
            let quantity = store.update_quantity(&kettle.id, delta)?;

            assert_eq!(quantity.map(|q| q >= 1), Some(true), "delta {delta}");
        }

        assert_eq!(store.update_quantity(&kettle.id, -1)?, Some(1));
        assert_eq!(store.update_quantity(&kettle.id, 3)?, Some(4));

        Ok(())
    }

    #[test]
    fn updating_unknown_line_changes_nothing() -> TestResult {
        let store = memory_store();

        store.add_or_increment(&product("kettle", 100))?;

        assert_eq!(store.update_quantity(&ProductId::from("toaster"), 1)?, None);
        assert_eq!(store.count(), 1);

        Ok(())
    }

    #[test]
    fn remove_drops_only_matching_line() -> TestResult {
        let store = memory_store();

        store.add_or_increment(&product("kettle", 100))?;
        store.add_or_increment(&product("toaster", 50))?;

        assert!(store.remove(&ProductId::from("kettle"))?);
        assert!(!store.remove(&ProductId::from("kettle"))?);

        let ids: Vec<_> = store.load().into_iter().map(|item| item.id).collect();

        assert_eq!(ids, [LineId::from("toaster")]);

        Ok(())
    }

    #[test]
    fn clear_then_load_is_empty() -> TestResult {
        let store = memory_store();

        store.add_or_increment(&product("kettle", 100))?;
        store.clear()?;

        assert!(store.load().is_empty());

        Ok(())
    }

    #[test]
    fn count_sums_quantities() -> TestResult {
        let store = memory_store();
        let kettle = product("kettle", 100);

        store.add_or_increment(&kettle)?;
        store.add_or_increment(&kettle)?;
        store.add_or_increment(&product("toaster", 50))?;

        assert_eq!(store.count(), 3);

        Ok(())
    }

    #[test]
    fn writes_versioned_envelope() -> TestResult {
        let slot = Arc::new(MemorySlot::default());
        let store = LocalCartStore::new(slot.clone());

        store.add_or_increment(&product("kettle", 100))?;

        let written: Value = serde_json::from_str(&slot.read()?.unwrap_or_default())?;

        assert_eq!(written["version"], json!(1));
        assert_eq!(written["items"][0]["_id"], json!("kettle"));
        assert_eq!(written["items"][0]["quantity"], json!(1));

        Ok(())
    }

    #[test]
    fn legacy_array_is_migrated_and_quantity_normalised() {
        let legacy = json!([
            { "_id": "kettle", "productName": "Kettle", "selling": 100, "quantity": 2 },
            { "_id": "toaster", "productName": "Toaster", "selling": 40 }
        ]);
        let store = LocalCartStore::new(Arc::new(MemorySlot::with_contents(legacy.to_string())));

        let items = store.load();

        assert_eq!(items.len(), 2);
        assert_eq!(items.first().map(|item| item.quantity), Some(2));
        assert_eq!(items.get(1).map(|item| item.quantity), Some(1));
        assert_eq!(
            items.get(1).map(|item| item.product.selling),
            Some(Decimal::from(40))
        );
    }

    #[test]
    fn invalid_or_unknown_data_loads_empty() {
        for contents in [
            "not json",
            "42",
            r#"{"version": 99, "items": []}"#,
            r#"[{"no_id": true}]"#,
        ] {
            let store = LocalCartStore::new(Arc::new(MemorySlot::with_contents(contents)));

            assert!(store.load().is_empty(), "expected empty cart for {contents}");
        }
    }

    #[test]
    fn clamp_handles_extremes() {
        assert_eq!(clamp_quantity(1, -1), 1);
        assert_eq!(clamp_quantity(u32::MAX, 1), u32::MAX);
        assert_eq!(clamp_quantity(3, i64::MIN), 1);
    }
}
