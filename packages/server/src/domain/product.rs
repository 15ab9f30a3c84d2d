//! Product Lookup (external collaborator)

use async_trait::async_trait;

use super::{Message, ProductId};

/// Display data of a catalog product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub image_url: Option<String>,
}

/// Resolves product ids when a product share is rendered.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn lookup(&self, id: &ProductId) -> Option<ProductSummary>;
}

/// A log entry joined with live product data at read time
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub message: Message,
    pub product: Option<ProductSummary>,
}
