//! Server-side cart for signed-in users.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    domain::{
        carts::models::{CartLineItem, LineId},
        products::models::{ProductId, ProductSnapshot},
    },
    http::{BackendClient, BackendError, Endpoint},
};

/// A failed remote cart call, tagged with the text to show the user.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RemoteFailure {
    /// Backend message, or a generic fallback.
    pub message: String,

    #[source]
    pub source: BackendError,
}

impl From<BackendError> for RemoteFailure {
    fn from(source: BackendError) -> Self {
        Self {
            message: source.user_message(),
            source,
        }
    }
}

/// A cart line as listed by the backend.
///
/// `productId` is populated with the live product document, or `null` when
/// the product has since been deleted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteCartLine {
    #[serde(rename = "_id")]
    pub id: LineId,

    #[serde(rename = "productId")]
    pub product: Option<ProductSnapshot>,

    #[serde(default)]
    pub quantity: u32,
}

impl RemoteCartLine {
    /// Convert to a view line, dropping lines whose product is gone.
    #[must_use]
    pub fn into_line_item(self) -> Option<CartLineItem> {
        let Some(product) = self.product else {
            warn!(line = %self.id, "cart line references a missing product, skipping");

            return None;
        };

        Some(CartLineItem {
            id: self.id,
            product,
            quantity: self.quantity.max(1),
        })
    }
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    #[serde(rename = "productId")]
    product_id: &'a ProductId,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "_id")]
    id: &'a LineId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    #[serde(rename = "_id")]
    id: &'a LineId,
}

#[derive(Debug, Deserialize)]
struct CountData {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Clone)]
pub struct HttpRemoteCart {
    client: BackendClient,
}

impl HttpRemoteCart {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteCartService for HttpRemoteCart {
    async fn list(&self) -> Result<Vec<RemoteCartLine>, RemoteFailure> {
        Ok(self
            .client
            .get(Endpoint::CartProducts)
            .await?
            .into_data()?)
    }

    async fn add(&self, product: &ProductId) -> Result<Option<String>, RemoteFailure> {
        Ok(self
            .client
            .post::<_, serde_json::Value>(
                Endpoint::AddToCart,
                &AddRequest {
                    product_id: product,
                },
                None,
            )
            .await?
            .into_message()?)
    }

    async fn update_quantity(
        &self,
        line: &LineId,
        quantity: u32,
    ) -> Result<Option<String>, RemoteFailure> {
        Ok(self
            .client
            .post::<_, serde_json::Value>(
                Endpoint::UpdateCart,
                &UpdateRequest { id: line, quantity },
                None,
            )
            .await?
            .into_message()?)
    }

    async fn remove(&self, line: &LineId) -> Result<Option<String>, RemoteFailure> {
        Ok(self
            .client
            .post::<_, serde_json::Value>(Endpoint::DeleteCart, &DeleteRequest { id: line }, None)
            .await?
            .into_message()?)
    }

    async fn count(&self) -> Result<u64, RemoteFailure> {
        let data: CountData = self.client.get(Endpoint::CartCount).await?.into_data()?;

        Ok(data.count)
    }
}

/// Thin mapping onto the backend cart endpoints.
///
/// Every call needs an authenticated session and hits the backend; nothing is
/// cached.
#[automock]
#[async_trait]
pub trait RemoteCartService: Send + Sync {
    /// List the user's cart lines in server order.
    async fn list(&self) -> Result<Vec<RemoteCartLine>, RemoteFailure>;

    /// Add one unit of `product`; dedup is left to the backend.
    async fn add(&self, product: &ProductId) -> Result<Option<String>, RemoteFailure>;

    /// Set the absolute quantity of a line.
    async fn update_quantity(
        &self,
        line: &LineId,
        quantity: u32,
    ) -> Result<Option<String>, RemoteFailure>;

    /// Delete a line.
    async fn remove(&self, line: &LineId) -> Result<Option<String>, RemoteFailure>;

    /// Total quantity for the cart badge.
    async fn count(&self) -> Result<u64, RemoteFailure>;
}
