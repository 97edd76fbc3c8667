//! Backend endpoint table.

use reqwest::Method;

/// REST endpoints the storefront talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Currently authenticated user.
    UserDetails,

    /// Single product lookup, suffixed with the product id.
    ProductDetails,

    /// List the authenticated user's cart lines.
    CartProducts,

    /// Add a product to the authenticated user's cart.
    AddToCart,

    /// Set the quantity of a cart line.
    UpdateCart,

    /// Delete a cart line.
    DeleteCart,

    /// Total quantity in the authenticated user's cart.
    CartCount,

    /// Request a hosted-payment order token.
    CreateOrder,

    /// Forward a hosted-payment callback for signature verification.
    VerifyPayment,

    /// Place a cash-on-delivery order.
    CreateCodOrder,
}

impl Endpoint {
    /// Path relative to the backend base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::UserDetails => "/api/user-details",
            Self::ProductDetails => "/api/product-details",
            Self::CartProducts => "/api/cart-products",
            Self::AddToCart => "/api/addtocart",
            Self::UpdateCart => "/api/update-cart",
            Self::DeleteCart => "/api/delete-cart",
            Self::CartCount => "/api/countAddToProduct",
            Self::CreateOrder => "/api/create-order",
            Self::VerifyPayment => "/api/verify-payment",
            Self::CreateCodOrder => "/api/create-cod-order",
        }
    }

    /// HTTP method the backend expects.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::UserDetails | Self::ProductDetails | Self::CartProducts | Self::CartCount => {
                Method::GET
            }
            Self::AddToCart
            | Self::UpdateCart
            | Self::DeleteCart
            | Self::CreateOrder
            | Self::VerifyPayment
            | Self::CreateCodOrder => Method::POST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_mutations_are_posts() {
        for endpoint in [Endpoint::AddToCart, Endpoint::UpdateCart, Endpoint::DeleteCart] {
            assert_eq!(endpoint.method(), Method::POST, "{endpoint:?} should POST");
        }
    }

    #[test]
    fn reads_are_gets() {
        assert_eq!(Endpoint::CartProducts.method(), Method::GET);
        assert_eq!(Endpoint::CartCount.method(), Method::GET);
        assert_eq!(Endpoint::CartCount.path(), "/api/countAddToProduct");
    }
}
