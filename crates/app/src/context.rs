//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::StorefrontConfig,
    domain::{
        carts::{
            CartAggregator, HttpRemoteCart, LocalCartStore,
            local::GUEST_CART_SLOT,
            storage::{CartSlot, FileSlot},
        },
        checkout::{
            CheckoutController, CheckoutDependencies, HttpOrdersService, OrdersService,
            settlement::{CodSettlement, GatewaySettlement, gateway::HostedPayment},
        },
        products::{HttpProductsService, ProductsService},
        session::{HttpSessionService, SessionService, models::UserSession},
    },
    http::{BackendClient, BackendError},
    navigation::Navigator,
    notifications::Notifier,
    store::AppStore,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to build backend client")]
    Backend(#[source] BackendError),
}

/// Host-provided integrations the library cannot supply itself.
pub struct Surfaces {
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub hosted_payment: Arc<dyn HostedPayment>,
}

#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<AppStore>,
    pub products: Arc<dyn ProductsService>,
    pub session: Arc<dyn SessionService>,
    pub cart: Arc<CartAggregator>,
    pub checkout: Arc<CheckoutController>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store)
            .field("cart", &self.cart)
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend client cannot be built.
    pub fn from_config(
        config: &StorefrontConfig,
        surfaces: Surfaces,
    ) -> Result<Self, AppInitError> {
        let client =
            BackendClient::new(&config.backend.settings()).map_err(AppInitError::Backend)?;

        let slot: Arc<dyn CartSlot> = Arc::new(FileSlot::new(
            &config.storage.resolved_data_dir(),
            GUEST_CART_SLOT,
        ));

        let store = Arc::new(AppStore::new());

        let cart = Arc::new(CartAggregator::new(
            store.clone(),
            Arc::new(LocalCartStore::new(slot)),
            Arc::new(HttpRemoteCart::new(client.clone())),
            surfaces.notifier.clone(),
        ));

        let orders: Arc<dyn OrdersService> = Arc::new(HttpOrdersService::new(client.clone()));

        let checkout = CheckoutController::new(
            CheckoutDependencies {
                cart: cart.clone(),
                cod: Arc::new(CodSettlement::new(orders.clone())),
                gateway: Arc::new(GatewaySettlement::new(
                    orders,
                    surfaces.hosted_payment,
                    config.checkout.gateway_settings(),
                )),
                notifier: surfaces.notifier,
                navigator: surfaces.navigator,
            },
            config.checkout.redirect_delay(),
        );

        Ok(Self {
            store,
            products: Arc::new(HttpProductsService::new(client.clone())),
            session: Arc::new(HttpSessionService::new(client)),
            cart,
            checkout: Arc::new(checkout),
        })
    }

    /// Resolve the ambient session and publish it with the cart count.
    ///
    /// A signed-in user has the guest cart merged into their account. Lookup
    /// failures fall back to guest mode.
    pub async fn restore_session(&self) -> Option<UserSession> {
        match self.session.current_user().await {
            Ok(Some(user)) => {
                info!(user = %user.id, "session restored");

                self.cart.sign_in(user.clone()).await;

                Some(user)
            }
            Ok(None) => {
                self.cart.refresh_count().await;

                None
            }
            Err(error) => {
                warn!("failed to resolve session, continuing as guest: {error}");

                self.cart.refresh_count().await;

                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        domain::{
            carts::remote::MockRemoteCartService,
            checkout::settlement::{MockSettlementStrategy, SettlementStrategy},
            products::MockProductsService,
            session::MockSessionService,
        },
        navigation::MockNavigator,
        test::fixtures::{RecordingNotifier, memory_store, product, strict_remote, user},
    };

    use super::*;

    fn context(session: MockSessionService, remote: MockRemoteCartService) -> AppContext {
        let store = Arc::new(AppStore::new());
        let local = Arc::new(memory_store());
        let notifier = Arc::new(RecordingNotifier::default());

        if let Err(error) = local.add_or_increment(&product("kettle", 100)) {
            panic!("seeding guest cart failed: {error}");
        }

        let cart = Arc::new(CartAggregator::new(
            store.clone(),
            local,
            Arc::new(remote),
            notifier.clone(),
        ));

        let unused = || -> Arc<dyn SettlementStrategy> {
            let mut strategy = MockSettlementStrategy::new();
            strategy.expect_settle().never();

            Arc::new(strategy)
        };

        let checkout = CheckoutController::new(
            CheckoutDependencies {
                cart: cart.clone(),
                cod: unused(),
                gateway: unused(),
                notifier,
                navigator: Arc::new(MockNavigator::new()),
            },
            Duration::ZERO,
        );

        AppContext {
            store,
            products: Arc::new(MockProductsService::new()),
            session: Arc::new(session),
            cart,
            checkout: Arc::new(checkout),
        }
    }

    #[tokio::test]
    async fn guest_session_publishes_local_count() {
        let mut session = MockSessionService::new();
        session.expect_current_user().once().returning(|| Ok(None));

        let ctx = context(session, strict_remote());

        assert_eq!(ctx.restore_session().await, None);
        assert!(!ctx.store.is_authenticated());
        assert_eq!(ctx.store.cart_count(), 1);
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_guest() {
        let mut session = MockSessionService::new();
        session
            .expect_current_user()
            .once()
            .returning(|| Err(BackendError::Malformed("not json".to_string())));

        let ctx = context(session, strict_remote());

        assert_eq!(ctx.restore_session().await, None);
        assert_eq!(ctx.store.cart_count(), 1);
    }

    #[tokio::test]
    async fn signed_in_session_merges_guest_cart() {
        let mut session = MockSessionService::new();
        session
            .expect_current_user()
            .once()
            .returning(|| Ok(Some(user())));

        let mut remote = MockRemoteCartService::new();
        remote.expect_list().once().returning(|| Ok(Vec::new()));
        remote
            .expect_add()
            .once()
            .withf(|id| id.as_str() == "kettle")
            .returning(|_| Ok(None));
        remote.expect_count().once().returning(|| Ok(1));

        let ctx = context(session, remote);

        assert_eq!(ctx.restore_session().await, Some(user()));
        assert!(ctx.store.is_authenticated());
        assert_eq!(ctx.store.cart_count(), 1);
    }
}
