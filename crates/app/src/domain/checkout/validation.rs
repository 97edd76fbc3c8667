//! Checkout form validation.
//!
//! Runs before any network call.

use crate::domain::{
    carts::models::{CartView, LineId},
    checkout::{
        errors::ValidationError,
        models::{CheckoutSelection, ShippingAddress},
    },
};

/// Check that every shipping field is filled in.
///
/// # Errors
///
/// Returns the first missing field.
pub fn validate_shipping(shipping: &ShippingAddress) -> Result<(), ValidationError> {
    match shipping.first_missing() {
        Some(field) => Err(ValidationError::MissingField(field)),
        None => Ok(()),
    }
}

/// Narrow `view` to the selected lines and check there is something to buy.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyCart`] when nothing is selected and
/// [`ValidationError::UnknownItem`] when a single-line selection is not in the
/// cart.
pub fn select_lines(
    view: CartView,
    selection: &CheckoutSelection,
) -> Result<CartView, ValidationError> {
    let view = match selection {
        CheckoutSelection::Cart => view,
        CheckoutSelection::Single(id) => single_line(view, id)?,
    };

    if view.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    Ok(view)
}

fn single_line(view: CartView, id: &LineId) -> Result<CartView, ValidationError> {
    let line = view
        .items
        .into_iter()
        .find(|item| &item.id == id)
        .ok_or_else(|| ValidationError::UnknownItem(id.clone()))?;

    Ok(CartView::from_items(vec![line]))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::checkout::models::AddressField,
        test::fixtures::{address, line},
    };

    use super::*;

    #[test]
    fn each_blank_field_is_rejected() {
        for field in AddressField::ALL {
            let mut shipping = address();

            match field {
                AddressField::Name => shipping.name.clear(),
                AddressField::Phone => shipping.phone.clear(),
                AddressField::Address => shipping.address.clear(),
                AddressField::City => shipping.city.clear(),
                AddressField::Pincode => shipping.pincode.clear(),
            }

            assert_eq!(
                validate_shipping(&shipping),
                Err(ValidationError::MissingField(field)),
                "{field} should be required"
            );
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        let result = select_lines(CartView::empty(), &CheckoutSelection::Cart);

        assert_eq!(result, Err(ValidationError::EmptyCart));
    }

    #[test]
    fn single_selection_recomputes_totals_for_that_line() -> TestResult {
        let view = CartView::from_items(vec![line("kettle", 100, 2), line("toaster", 40, 1)]);

        let selected = select_lines(view, &CheckoutSelection::Single(LineId::from("toaster")))?;

        assert_eq!(selected.items.len(), 1);
        assert_eq!(selected.subtotal, Decimal::from(40));
        assert_eq!(selected.total, Decimal::from(42));

        Ok(())
    }

    #[test]
    fn unknown_single_selection_is_rejected() {
        let view = CartView::from_items(vec![line("kettle", 100, 1)]);

        let result = select_lines(view, &CheckoutSelection::Single(LineId::from("toaster")));

        assert_eq!(
            result,
            Err(ValidationError::UnknownItem(LineId::from("toaster")))
        );
    }
}
