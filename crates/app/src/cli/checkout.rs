use clap::Args;
use storefront_app::{
    context::AppContext,
    domain::{
        carts::models::LineId,
        checkout::{
            CheckoutOutcome,
            models::{CheckoutForm, CheckoutSelection, PaymentMethod, ShippingAddress},
        },
    },
};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Full name of the recipient
    #[arg(long)]
    name: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// Street address
    #[arg(long)]
    address: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    pincode: String,

    /// Buy only this line instead of the whole cart
    #[arg(long)]
    item: Option<String>,
}

pub(crate) async fn run(ctx: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let form = CheckoutForm {
        shipping: ShippingAddress {
            name: args.name,
            phone: args.phone,
            address: args.address,
            city: args.city,
            pincode: args.pincode,
        },
        payment_method: PaymentMethod::Cod,
        selection: args
            .item
            .map_or(CheckoutSelection::Cart, |id| {
                CheckoutSelection::Single(LineId::from(id))
            }),
    };

    match ctx.checkout.submit(form).await {
        CheckoutOutcome::Settled { message } => {
            println!("{message}");

            Ok(())
        }
        CheckoutOutcome::Rejected(error) => Err(error.user_message()),
        CheckoutOutcome::Failed(failure) => Err(failure.user_message()),
        CheckoutOutcome::Busy | CheckoutOutcome::Discarded => {
            Err("checkout did not complete".to_string())
        }
    }
}
