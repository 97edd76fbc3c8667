use storefront_app::domain::carts::models::CartView;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};

pub(crate) fn print_cart(view: &CartView) {
    if view.is_empty() {
        println!("Your cart is empty");

        return;
    }

    let mut builder = Builder::default();

    builder.push_record(["Line", "Item", "Unit Price", "Qty", "Line Total"]);

    for item in &view.items {
        builder.push_record([
            item.id.to_string(),
            item.product.name.clone(),
            item.product.selling.to_string(),
            item.quantity.to_string(),
            item.line_total().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..5), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    println!("{table}");
    println!("Subtotal: {}", view.subtotal);
    println!("Tax (5%): {}", view.tax);
    println!("Total:    {}", view.total);
}
