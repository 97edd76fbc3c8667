//! Deferred navigation.

use std::time::Duration;

use mockall::automock;
use tokio::{sync::mpsc, time::sleep};
use tracing::debug;

/// Places the storefront can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Landing page.
    Home,
}

/// Schedules navigation after a delay.
#[automock]
pub trait Navigator: Send + Sync {
    /// Navigate to `destination` once `delay` has elapsed.
    fn schedule(&self, destination: Destination, delay: Duration);
}

/// Navigator that emits destinations on a channel after sleeping.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct DeferredNavigator {
    routes: mpsc::UnboundedSender<Destination>,
}

impl DeferredNavigator {
    /// Create a navigator and the receiver the router reads from.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Destination>) {
        let (routes, rx) = mpsc::unbounded_channel();

        (Self { routes }, rx)
    }
}

impl Navigator for DeferredNavigator {
    fn schedule(&self, destination: Destination, delay: Duration) {
        let routes = self.routes.clone();

        tokio::spawn(async move {
            sleep(delay).await;

            if routes.send(destination).is_err() {
                debug!(?destination, "router gone, dropping navigation");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn navigation_fires_after_delay() -> TestResult {
        let (navigator, mut routes) = DeferredNavigator::new();

        navigator.schedule(Destination::Home, Duration::from_millis(1_500));

        tokio::task::yield_now().await;
        assert!(routes.try_recv().is_err(), "navigated before the delay");

        tokio::time::advance(Duration::from_millis(1_500)).await;

        assert_eq!(routes.recv().await, Some(Destination::Home));

        Ok(())
    }
}
