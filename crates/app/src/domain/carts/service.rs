//! Cart aggregator.
//!
//! Picks the local or remote cart on every call based on whether the store
//! holds a session, and keeps the cart badge in sync after each mutation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    domain::{
        carts::{
            errors::CartError,
            local::{AddOutcome, LocalCartStore},
            models::{CartLineItem, CartView, LineId},
            remote::{RemoteCartLine, RemoteCartService},
        },
        products::models::{ProductId, ProductSnapshot},
        session::models::UserSession,
    },
    notifications::{Notification, Notifier},
    store::AppStore,
};

/// Outcome of merging a guest cart into the remote cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Guest lines now present in the remote cart.
    pub merged: usize,

    /// Guest lines left in the local cart because the backend refused them.
    pub failed: usize,

    /// Merged lines whose remote quantity could not be raised to the guest
    /// quantity. They are counted in `merged` too.
    pub short: usize,
}

/// How far a single guest line got into the remote cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergedLine {
    Complete,
    QuantityShort,
}

/// Single source of truth for the current cart.
pub struct CartAggregator {
    store: Arc<AppStore>,
    local: Arc<LocalCartStore>,
    remote: Arc<dyn RemoteCartService>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CartAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartAggregator")
            .field("store", &self.store)
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

impl CartAggregator {
    #[must_use]
    pub fn new(
        store: Arc<AppStore>,
        local: Arc<LocalCartStore>,
        remote: Arc<dyn RemoteCartService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            local,
            remote,
            notifier,
        }
    }

    /// The state store this aggregator reports to.
    #[must_use]
    pub fn store(&self) -> &Arc<AppStore> {
        &self.store
    }

    /// Current cart contents and charges.
    ///
    /// # Errors
    ///
    /// Returns an error when the remote cart cannot be listed. A notification
    /// is shown before returning.
    pub async fn view(&self) -> Result<CartView, CartError> {
        if !self.store.is_authenticated() {
            return Ok(CartView::from_items(self.local.load()));
        }

        let lines = self.remote_lines().await?;

        Ok(CartView::from_items(
            lines
                .into_iter()
                .filter_map(RemoteCartLine::into_line_item)
                .collect(),
        ))
    }

    /// Add one unit of `product` to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store rejects the change. A
    /// notification is shown before returning.
    pub async fn add_item(&self, product: &ProductSnapshot) -> Result<(), CartError> {
        if self.store.is_authenticated() {
            let message = self
                .remote
                .add(&product.id)
                .await
                .map_err(|failure| self.report(failure.into()))?;

            self.notifier.notify(Notification::success(
                message.unwrap_or_else(|| format!("{} added to cart", product.name)),
            ));
        } else {
            let outcome = self
                .local
                .add_or_increment(product)
                .map_err(|error| self.report(error.into()))?;

            self.notifier.notify(match outcome {
                AddOutcome::Added => {
                    Notification::success(format!("{} added to cart", product.name))
                }
                AddOutcome::QuantityIncreased(_) => {
                    Notification::info(format!("{} quantity increased", product.name))
                }
            });
        }

        self.refresh_count().await;

        Ok(())
    }

    /// Change a line's quantity by `delta`, never going below 1.
    ///
    /// Decrementing a line already at 1 changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error when the line does not exist or the backing store
    /// rejects the change. A notification is shown before returning.
    pub async fn update_item_quantity(&self, id: &LineId, delta: i64) -> Result<(), CartError> {
        if self.store.is_authenticated() {
            let lines = self.remote_lines().await?;

            let line = lines
                .iter()
                .find(|line| &line.id == id)
                .ok_or_else(|| self.report(CartError::LineNotFound(id.clone())))?;

            let current = line.quantity.max(1);
            let next = clamp(current, delta);

            if next != current {
                self.remote
                    .update_quantity(id, next)
                    .await
                    .map_err(|failure| self.report(failure.into()))?;
            }
        } else {
            self.local
                .update_quantity(&ProductId::from(id.as_str()), delta)
                .map_err(|error| self.report(error.into()))?
                .ok_or_else(|| self.report(CartError::LineNotFound(id.clone())))?;
        }

        self.refresh_count().await;

        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store rejects the change. A
    /// notification is shown before returning.
    pub async fn remove_item(&self, id: &LineId) -> Result<(), CartError> {
        if self.store.is_authenticated() {
            self.remote
                .remove(id)
                .await
                .map_err(|failure| self.report(failure.into()))?;
        } else {
            self.local
                .remove(&ProductId::from(id.as_str()))
                .map_err(|error| self.report(error.into()))?;
        }

        self.notifier
            .notify(Notification::success("Item removed from cart"));

        self.refresh_count().await;

        Ok(())
    }

    /// Empty both the local and, when signed in, the remote cart.
    ///
    /// Remote lines that fail to delete are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error when the local cart cannot be cleared.
    pub async fn clear(&self) -> Result<(), CartError> {
        let local = self.local.clear();

        if self.store.is_authenticated() {
            match self.remote.list().await {
                Ok(lines) => {
                    for line in lines {
                        if let Err(failure) = self.remote.remove(&line.id).await {
                            warn!(line = %line.id, "failed to delete remote cart line: {failure}");
                        }
                    }
                }
                Err(failure) => warn!("failed to list remote cart for clearing: {failure}"),
            }
        }

        self.refresh_count().await;

        local.map_err(CartError::from)
    }

    /// Recompute the cart badge and publish it to the store.
    pub async fn refresh_count(&self) -> u64 {
        let count = if self.store.is_authenticated() {
            self.remote.count().await.unwrap_or_else(|failure| {
                warn!("failed to fetch cart count: {failure}");

                0
            })
        } else {
            self.local.count()
        };

        self.store.set_cart_count(count);

        count
    }

    /// Start a session and move the guest cart into the remote cart.
    ///
    /// Quantities are added to any existing remote line for the same product.
    /// Lines the backend refuses stay in the local cart. A line that reached
    /// the remote cart leaves the guest cart even when its quantity could not
    /// be set, so a later sign-in never adds it twice.
    pub async fn sign_in(&self, user: UserSession) -> MergeReport {
        self.store.sign_in(user);

        let guest = self.local.load();

        let report = if guest.is_empty() {
            MergeReport::default()
        } else {
            self.merge_guest_lines(guest).await
        };

        if report.merged > 0 {
            info!(
                merged = report.merged,
                failed = report.failed,
                short = report.short,
                "guest cart merged"
            );
        }

        if report.failed > 0 {
            self.notifier.notify(Notification::error(
                "Some items from your guest cart could not be moved to your account",
            ));
        } else if report.short > 0 {
            self.notifier.notify(Notification::error(
                "Some item quantities from your guest cart could not be moved to your account",
            ));
        }

        self.refresh_count().await;

        report
    }

    /// End the session; the cart falls back to the local store.
    pub async fn sign_out(&self) {
        self.store.sign_out();
        self.refresh_count().await;
    }

    async fn merge_guest_lines(&self, guest: Vec<CartLineItem>) -> MergeReport {
        let mut report = MergeReport::default();

        let remote = match self.remote.list().await {
            Ok(lines) => lines,
            Err(failure) => {
                warn!("cannot merge guest cart, remote cart unavailable: {failure}");

                report.failed = guest.len();

                return report;
            }
        };

        for item in guest {
            match self.merge_line(&remote, &item).await {
                Ok(merged) => {
                    report.merged += 1;

                    if merged == MergedLine::QuantityShort {
                        report.short += 1;
                    }

                    if let Err(error) = self.local.remove(&item.product.id) {
                        warn!(product = %item.product.id, "merged line left in guest cart: {error}");
                    }
                }
                Err(failure) => {
                    warn!(product = %item.product.id, "failed to merge guest line: {failure}");

                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn merge_line(
        &self,
        remote: &[RemoteCartLine],
        item: &CartLineItem,
    ) -> Result<MergedLine, CartError> {
        let existing = remote.iter().find(|line| {
            line.product
                .as_ref()
                .is_some_and(|product| product.id == item.product.id)
        });

        if let Some(line) = existing {
            let quantity = line.quantity.max(1).saturating_add(item.quantity);

            self.remote.update_quantity(&line.id, quantity).await?;

            return Ok(MergedLine::Complete);
        }

        self.remote.add(&item.product.id).await?;

        if item.quantity <= 1 {
            return Ok(MergedLine::Complete);
        }

        if let Err(error) = self.raise_created_line(item).await {
            warn!(
                product = %item.product.id,
                quantity = item.quantity,
                "guest line added with quantity 1: {error}"
            );

            return Ok(MergedLine::QuantityShort);
        }

        Ok(MergedLine::Complete)
    }

    /// Set the line just created for `item` to the guest quantity.
    async fn raise_created_line(&self, item: &CartLineItem) -> Result<(), CartError> {
        let created = self
            .remote
            .list()
            .await?
            .into_iter()
            .find(|line| {
                line.product
                    .as_ref()
                    .is_some_and(|product| product.id == item.product.id)
            })
            .ok_or_else(|| CartError::LineNotFound(LineId::from(&item.product.id)))?;

        self.remote
            .update_quantity(&created.id, item.quantity)
            .await?;

        Ok(())
    }

    async fn remote_lines(&self) -> Result<Vec<RemoteCartLine>, CartError> {
        self.remote
            .list()
            .await
            .map_err(|failure| self.report(failure.into()))
    }

    fn report(&self, error: CartError) -> CartError {
        warn!("cart operation failed: {error}");

        self.notifier
            .notify(Notification::error(error.user_message()));

        error
    }
}

fn clamp(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta).max(1);

    u32::try_from(next).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::carts::remote::{MockRemoteCartService, RemoteFailure},
        http::BackendError,
        notifications::NotificationLevel,
        test::fixtures::{
            RecordingNotifier, memory_store, product, remote_line, strict_remote, user,
        },
    };

    use super::*;

    struct Harness {
        store: Arc<AppStore>,
        local: Arc<LocalCartStore>,
        notifier: Arc<RecordingNotifier>,
        cart: CartAggregator,
    }

    fn harness(remote: MockRemoteCartService, signed_in: bool) -> Harness {
        let store = Arc::new(AppStore::new());

        if signed_in {
            store.sign_in(user());
        }

        let local = Arc::new(memory_store());
        let notifier = Arc::new(RecordingNotifier::default());

        let cart = CartAggregator::new(
            store.clone(),
            local.clone(),
            Arc::new(remote),
            notifier.clone(),
        );

        Harness {
            store,
            local,
            notifier,
            cart,
        }
    }

    fn out_of_stock() -> RemoteFailure {
        RemoteFailure::from(BackendError::Unsuccessful {
            message: Some("Out of stock".to_string()),
        })
    }

    #[tokio::test]
    async fn guest_add_routes_to_local_store_and_updates_badge() -> TestResult {
        let h = harness(strict_remote(), false);
        let kettle = product("kettle", 100);

        h.cart.add_item(&kettle).await?;
        h.cart.add_item(&kettle).await?;

        let view = h.cart.view().await?;

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.item_count(), 2);
        assert_eq!(h.store.cart_count(), 2);
        assert_eq!(
            h.notifier.messages(),
            ["Kettle added to cart", "Kettle quantity increased"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn signed_in_add_routes_to_remote_and_refreshes_count() -> TestResult {
        let mut remote = MockRemoteCartService::new();

        remote
            .expect_add()
            .once()
            .withf(|id| id.as_str() == "kettle")
            .returning(|_| Ok(Some("Product added in cart".to_string())));
        remote.expect_count().once().returning(|| Ok(4));

        let h = harness(remote, true);

        h.cart.add_item(&product("kettle", 100)).await?;

        assert_eq!(h.store.cart_count(), 4);
        assert!(h.local.load().is_empty(), "guest cart must stay untouched");
        assert_eq!(h.notifier.messages(), ["Product added in cart"]);

        Ok(())
    }

    #[tokio::test]
    async fn remote_failure_is_reported_and_not_applied() {
        let mut remote = MockRemoteCartService::new();

        remote.expect_add().once().returning(|_| Err(out_of_stock()));
        remote.expect_count().never();

        let h = harness(remote, true);
        h.store.set_cart_count(7);

        let result = h.cart.add_item(&product("kettle", 100)).await;

        assert!(matches!(result, Err(CartError::Remote(_))), "got {result:?}");
        assert_eq!(h.store.cart_count(), 7, "badge unchanged on failure");
        assert_eq!(
            h.notifier.last(),
            Some(Notification {
                level: NotificationLevel::Error,
                message: "Out of stock".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn signed_in_view_maps_remote_lines() -> TestResult {
        let mut remote = MockRemoteCartService::new();

        remote.expect_list().once().returning(|| {
            Ok(vec![
                remote_line("line-1", "kettle", 100, 2),
                remote_line("line-2", "toaster", 50, 1),
            ])
        });

        let h = harness(remote, true);

        let view = h.cart.view().await?;

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.subtotal, Decimal::from(250));
        assert_eq!(view.total, Decimal::from(263));

        Ok(())
    }

    #[tokio::test]
    async fn remote_decrement_at_one_is_a_no_op() -> TestResult {
        let mut remote = MockRemoteCartService::new();

        remote
            .expect_list()
            .once()
            .returning(|| Ok(vec![remote_line("line-1", "kettle", 100, 1)]));
        remote.expect_update_quantity().never();
        remote.expect_count().once().returning(|| Ok(1));

        let h = harness(remote, true);

        h.cart
            .update_item_quantity(&LineId::from("line-1"), -1)
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn remote_increment_sends_absolute_quantity() -> TestResult {
        let mut remote = MockRemoteCartService::new();

        remote
            .expect_list()
            .once()
            .returning(|| Ok(vec![remote_line("line-1", "kettle", 100, 2)]));
        remote
            .expect_update_quantity()
            .once()
            .withf(|id, quantity| id.as_str() == "line-1" && *quantity == 3)
            .returning(|_, _| Ok(None));
        remote.expect_count().once().returning(|| Ok(3));

        let h = harness(remote, true);

        h.cart
            .update_item_quantity(&LineId::from("line-1"), 1)
            .await?;

        assert_eq!(h.store.cart_count(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn guest_update_of_unknown_line_is_not_found() {
        let h = harness(strict_remote(), false);

        let result = h
            .cart
            .update_item_quantity(&LineId::from("missing"), 1)
            .await;

        assert!(matches!(result, Err(CartError::LineNotFound(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn guest_remove_notifies_and_updates_badge() -> TestResult {
        let h = harness(strict_remote(), false);

        h.local.add_or_increment(&product("kettle", 100))?;
        h.cart.remove_item(&LineId::from("kettle")).await?;

        assert!(h.local.load().is_empty());
        assert_eq!(h.store.cart_count(), 0);
        assert_eq!(h.notifier.messages(), ["Item removed from cart"]);

        Ok(())
    }

    #[tokio::test]
    async fn clear_empties_both_stores() -> TestResult {
        let mut remote = MockRemoteCartService::new();

        remote.expect_list().once().returning(|| {
            Ok(vec![
                remote_line("line-1", "kettle", 100, 1),
                remote_line("line-2", "toaster", 50, 1),
            ])
        });
        remote.expect_remove().times(2).returning(|_| Ok(None));
        remote.expect_count().once().returning(|| Ok(0));

        let h = harness(remote, true);
        h.local.add_or_increment(&product("kettle", 100))?;

        h.cart.clear().await?;

        assert!(h.local.load().is_empty());
        assert_eq!(h.store.cart_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn sign_in_merges_guest_lines_additively() -> TestResult {
        let mut remote = MockRemoteCartService::new();

        // Initial listing: kettle already in the account cart.
        remote
            .expect_list()
            .times(1)
            .returning(|| Ok(vec![remote_line("line-1", "kettle", 100, 1)]));
        remote
            .expect_update_quantity()
            .withf(|id, quantity| id.as_str() == "line-1" && *quantity == 3)
            .once()
            .returning(|_, _| Ok(None));
        remote
            .expect_add()
            .withf(|id| id.as_str() == "toaster")
            .once()
            .returning(|_| Ok(None));
        remote.expect_count().once().returning(|| Ok(4));

        let h = harness(remote, false);
        let kettle = product("kettle", 100);

        h.local.add_or_increment(&kettle)?;
        h.local.add_or_increment(&kettle)?;
        h.local.add_or_increment(&product("toaster", 50))?;

        let report = h.cart.sign_in(user()).await;

        assert_eq!(
            report,
            MergeReport {
                merged: 2,
                failed: 0,
                short: 0
            }
        );
        assert!(h.local.load().is_empty(), "merged lines leave the guest cart");
        assert_eq!(h.store.cart_count(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn sign_in_keeps_lines_the_backend_refuses() -> TestResult {
        let mut remote = MockRemoteCartService::new();

        remote.expect_list().once().returning(|| Ok(Vec::new()));
        remote.expect_add().once().returning(|_| Err(out_of_stock()));
        remote.expect_count().once().returning(|| Ok(0));

        let h = harness(remote, false);
        h.local.add_or_increment(&product("kettle", 100))?;

        let report = h.cart.sign_in(user()).await;

        assert_eq!(
            report,
            MergeReport {
                merged: 0,
                failed: 1,
                short: 0
            }
        );
        assert_eq!(h.local.load().len(), 1);
        assert_eq!(
            h.notifier.last().map(|n| n.level),
            Some(NotificationLevel::Error)
        );

        Ok(())
    }

    #[tokio::test]
    async fn created_line_without_its_quantity_is_not_merged_again() -> TestResult {
        let mut remote = MockRemoteCartService::new();
        let listings = Arc::new(AtomicUsize::new(0));

        // Empty before the add, then the freshly created line.
        remote.expect_list().times(2).returning({
            let listings = listings.clone();

            move || {
                if listings.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(Vec::new())
                } else {
                    Ok(vec![remote_line("line-1", "kettle", 100, 1)])
                }
            }
        });
        remote
            .expect_add()
            .withf(|id| id.as_str() == "kettle")
            .once()
            .returning(|_| Ok(None));
        remote
            .expect_update_quantity()
            .once()
            .returning(|_, _| Err(out_of_stock()));
        remote.expect_count().times(2).returning(|| Ok(1));

        let h = harness(remote, false);
        let kettle = product("kettle", 100);

        h.local.add_or_increment(&kettle)?;
        h.local.add_or_increment(&kettle)?;

        let report = h.cart.sign_in(user()).await;

        assert_eq!(
            report,
            MergeReport {
                merged: 1,
                failed: 0,
                short: 1
            }
        );
        assert!(h.local.load().is_empty());
        assert_eq!(
            h.notifier.last().map(|n| n.level),
            Some(NotificationLevel::Error)
        );

        h.cart.sign_out().await;

        assert_eq!(h.cart.sign_in(user()).await, MergeReport::default());
        assert_eq!(listings.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[tokio::test]
    async fn count_failure_resets_badge() {
        let mut remote = MockRemoteCartService::new();

        remote.expect_count().once().returning(|| Err(out_of_stock()));

        let h = harness(remote, true);
        h.store.set_cart_count(5);

        assert_eq!(h.cart.refresh_count().await, 0);
        assert_eq!(h.store.cart_count(), 0);
    }
}
