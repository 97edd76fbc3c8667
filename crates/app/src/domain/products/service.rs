//! Products service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    domain::products::models::{ProductId, ProductSnapshot},
    http::{BackendClient, BackendError, Endpoint},
};

#[derive(Debug, Clone)]
pub struct HttpProductsService {
    client: BackendClient,
}

impl HttpProductsService {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProductsService for HttpProductsService {
    async fn product_details(&self, product: &ProductId) -> Result<ProductSnapshot, BackendError> {
        self.client
            .get_with_segment(Endpoint::ProductDetails, product.as_str())
            .await?
            .into_data()
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Fetch a live snapshot of a single product.
    async fn product_details(&self, product: &ProductId) -> Result<ProductSnapshot, BackendError>;
}
