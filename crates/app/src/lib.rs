//! Storefront cart and checkout client.
//!
//! Guest carts live in a local slot and signed-in carts on the backend; the
//! [`CartAggregator`](domain::carts::CartAggregator) hides the difference.
//! Checkout settles either cash on delivery or through a hosted payment
//! gateway with server-side signature verification.

pub mod config;
pub mod context;
pub mod domain;
pub mod http;
pub mod navigation;
pub mod notifications;
pub mod observability;
pub mod store;

#[cfg(test)]
mod test;
