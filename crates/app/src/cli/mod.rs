use std::sync::Arc;

use clap::{Parser, Subcommand};
use storefront_app::{
    config::StorefrontConfig,
    context::{AppContext, Surfaces},
    domain::checkout::settlement::gateway::UnavailableHostedPayment,
    navigation::DeferredNavigator,
    notifications::TracingNotifier,
};

mod cart;
mod checkout;
mod table;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart and checkout CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: StorefrontConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Cart(cart::CartCommand),
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let (navigator, _routes) = DeferredNavigator::new();

        let ctx = AppContext::from_config(
            &self.config,
            Surfaces {
                notifier: Arc::new(TracingNotifier),
                navigator: Arc::new(navigator),
                hosted_payment: Arc::new(UnavailableHostedPayment),
            },
        )
        .map_err(|error| format!("failed to initialise storefront: {error}"))?;

        ctx.restore_session().await;

        match self.command {
            Commands::Cart(command) => cart::run(&ctx, command).await,
            Commands::Checkout(args) => checkout::run(&ctx, args).await,
        }
    }
}
