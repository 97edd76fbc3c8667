//! Checkout flow.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        carts::CartAggregator,
        checkout::{
            errors::{CheckoutFailure, ValidationError},
            models::{CheckoutForm, CheckoutOrderDraft, PaymentMethod},
            settlement::{Attempt, AttemptCounter, SettlementStrategy},
            validation::{select_lines, validate_shipping},
        },
    },
    navigation::{Destination, Navigator},
    notifications::{Notification, Notifier},
};

/// Default message when the backend confirms without one.
pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully!";

/// Where the checkout page is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Accepting a submission.
    #[default]
    Idle,

    Validating,

    /// An order request or hosted payment is in flight.
    Submitting,

    /// An order was confirmed; the flow is done.
    Settled,
}

/// Result of one call to [`CheckoutController::submit`].
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// The order was confirmed and the cart emptied.
    Settled { message: String },

    /// The form or selection was rejected before any order request.
    Rejected(ValidationError),

    /// The attempt failed; the cart is untouched.
    Failed(CheckoutFailure),

    /// Another attempt is already running.
    Busy,

    /// The attempt finished after the page moved on; its result was dropped.
    Discarded,
}

/// Dependencies of a [`CheckoutController`].
pub struct CheckoutDependencies {
    pub cart: Arc<CartAggregator>,
    pub cod: Arc<dyn SettlementStrategy>,
    pub gateway: Arc<dyn SettlementStrategy>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

/// Drives a checkout form through validation, settlement and cleanup.
///
/// At most one attempt is in flight at a time. A result for an attempt that
/// was superseded by [`abandon`](Self::abandon) never clears the cart or
/// navigates.
pub struct CheckoutController {
    cart: Arc<CartAggregator>,
    cod: Arc<dyn SettlementStrategy>,
    gateway: Arc<dyn SettlementStrategy>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    phase: Mutex<CheckoutPhase>,
    attempts: AttemptCounter,
}

impl std::fmt::Debug for CheckoutController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutController")
            .field("redirect_delay", &self.redirect_delay)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl CheckoutController {
    #[must_use]
    pub fn new(dependencies: CheckoutDependencies, redirect_delay: Duration) -> Self {
        let CheckoutDependencies {
            cart,
            cod,
            gateway,
            notifier,
            navigator,
        } = dependencies;

        Self {
            cart,
            cod,
            gateway,
            notifier,
            navigator,
            redirect_delay,
            phase: Mutex::default(),
            attempts: AttemptCounter::default(),
        }
    }

    /// Current phase.
    pub async fn phase(&self) -> CheckoutPhase {
        *self.phase.lock().await
    }

    /// Leave the checkout page.
    ///
    /// Any attempt still in flight is superseded and its result discarded.
    pub async fn abandon(&self) {
        self.attempts.invalidate();

        let mut phase = self.phase.lock().await;

        if *phase != CheckoutPhase::Settled {
            *phase = CheckoutPhase::Idle;
        }
    }

    /// Validate `form`, settle it, then clear the cart and send the user home.
    ///
    /// Shipping fields are validated before anything else, so a rejected form
    /// never touches the network.
    pub async fn submit(&self, form: CheckoutForm) -> CheckoutOutcome {
        {
            let mut phase = self.phase.lock().await;

            if matches!(
                *phase,
                CheckoutPhase::Validating | CheckoutPhase::Submitting
            ) {
                debug!("checkout already in progress, ignoring submission");

                return CheckoutOutcome::Busy;
            }

            *phase = CheckoutPhase::Validating;
        }

        let attempt = self.attempts.begin();

        let draft = match self.prepare(form).await {
            Ok(draft) => draft,
            Err(outcome) => {
                if !self.advance(&attempt, CheckoutPhase::Idle).await {
                    return CheckoutOutcome::Discarded;
                }

                return outcome;
            }
        };

        if !self.advance(&attempt, CheckoutPhase::Submitting).await {
            debug!(
                attempt = attempt.generation(),
                "checkout abandoned during validation, nothing submitted"
            );

            return CheckoutOutcome::Discarded;
        }

        info!(
            attempt = attempt.generation(),
            key = %draft.idempotency_key,
            method = ?draft.payment_method,
            total = %draft.total,
            "submitting checkout"
        );

        let strategy = match draft.payment_method {
            PaymentMethod::Cod => &self.cod,
            PaymentMethod::Online => &self.gateway,
        };

        let result = strategy.settle(&draft, &attempt).await;

        if !attempt.is_current() {
            debug!(
                attempt = attempt.generation(),
                "dropping result of superseded checkout attempt"
            );

            return CheckoutOutcome::Discarded;
        }

        match result {
            Ok(settlement) => {
                if let Err(error) = self.cart.clear().await {
                    warn!("order placed but cart could not be cleared: {error}");
                }

                let message = settlement
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| ORDER_PLACED_MESSAGE.to_string());

                self.notifier.notify(Notification::success(message.clone()));
                self.navigator
                    .schedule(Destination::Home, self.redirect_delay);
                self.advance(&attempt, CheckoutPhase::Settled).await;

                CheckoutOutcome::Settled { message }
            }
            Err(CheckoutFailure::Superseded) => CheckoutOutcome::Discarded,
            Err(failure) => {
                warn!(kind = ?failure.kind(), "checkout failed: {failure}");

                self.notifier
                    .notify(Notification::error(failure.user_message()));
                self.advance(&attempt, CheckoutPhase::Idle).await;

                CheckoutOutcome::Failed(failure)
            }
        }
    }

    async fn prepare(&self, form: CheckoutForm) -> Result<CheckoutOrderDraft, CheckoutOutcome> {
        let CheckoutForm {
            shipping,
            payment_method,
            selection,
        } = form;

        validate_shipping(&shipping).map_err(|error| self.reject(error))?;

        // The aggregator has already notified about a failed view.
        let view = self
            .cart
            .view()
            .await
            .map_err(|error| CheckoutOutcome::Failed(CheckoutFailure::Cart(error)))?;

        let view = select_lines(view, &selection).map_err(|error| self.reject(error))?;

        Ok(CheckoutOrderDraft::freeze(&view, shipping, payment_method))
    }

    fn reject(&self, error: ValidationError) -> CheckoutOutcome {
        self.notifier
            .notify(Notification::error(error.user_message()));

        CheckoutOutcome::Rejected(error)
    }

    /// Move to `next` unless `attempt` has been superseded.
    ///
    /// Returns whether the attempt is still current.
    async fn advance(&self, attempt: &Attempt, next: CheckoutPhase) -> bool {
        let mut phase = self.phase.lock().await;
        let current = attempt.is_current();

        if current {
            *phase = next;
        }

        current
    }
}
