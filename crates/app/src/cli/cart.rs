use clap::{Args, Subcommand};
use storefront_app::{
    context::AppContext,
    domain::{carts::models::LineId, products::models::ProductId},
};

use super::table;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart with its charges
    Show,

    /// Add one unit of a product
    Add {
        /// Product id
        product_id: String,
    },

    /// Increase a line's quantity by one
    Increment {
        /// Line id (the product id for guest carts)
        id: String,
    },

    /// Decrease a line's quantity by one, never below one
    Decrement {
        /// Line id (the product id for guest carts)
        id: String,
    },

    /// Remove a line
    Remove {
        /// Line id (the product id for guest carts)
        id: String,
    },

    /// Empty the cart
    Clear,
}

pub(crate) async fn run(ctx: &AppContext, command: CartCommand) -> Result<(), String> {
    let cart = &ctx.cart;

    let result = match command.command {
        CartSubcommand::Show => Ok(()),
        CartSubcommand::Add { product_id } => {
            let product = ctx
                .products
                .product_details(&ProductId::from(product_id))
                .await
                .map_err(|error| format!("failed to load product: {}", error.user_message()))?;

            cart.add_item(&product).await
        }
        CartSubcommand::Increment { id } => cart.update_item_quantity(&LineId::from(id), 1).await,
        CartSubcommand::Decrement { id } => {
            cart.update_item_quantity(&LineId::from(id), -1).await
        }
        CartSubcommand::Remove { id } => cart.remove_item(&LineId::from(id)).await,
        CartSubcommand::Clear => cart.clear().await,
    };

    result.map_err(|error| error.user_message())?;

    let view = cart.view().await.map_err(|error| error.user_message())?;

    table::print_cart(&view);

    Ok(())
}
