//! インメモリ商品カタログ
//!
//! 商品検索・在庫などは外部サービスの責務です。このサーバーは商品共有メッセージの
//! 表示に必要な最小限の情報だけを ID で引ければよいので、起動時に JSON ファイルから
//! 読み込んだカタログを保持します。

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    domain::{ProductId, ProductLookup, ProductSummary},
    infrastructure::dto::http::ProductDto,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read product catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse product catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid product id in catalog: '{0}'")]
    InvalidProductId(String),
}

#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    products: HashMap<ProductId, ProductSummary>,
}

impl InMemoryProductCatalog {
    pub fn new(products: Vec<ProductSummary>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Parse a JSON array of products
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<ProductDto> = serde_json::from_str(json)?;
        let products = entries
            .into_iter()
            .map(|dto| {
                let id = ProductId::new(dto.id.clone())
                    .map_err(|_| CatalogError::InvalidProductId(dto.id.clone()))?;
                Ok(ProductSummary {
                    id,
                    name: dto.name,
                    price: dto.price,
                    currency: dto.currency,
                    image_url: dto.image_url,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        Ok(Self::new(products))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl ProductLookup for InMemoryProductCatalog {
    async fn lookup(&self, id: &ProductId) -> Option<ProductSummary> {
        self.products.get(id).cloned()
    }
}
