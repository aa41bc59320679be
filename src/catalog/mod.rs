mod storage;
mod types;

pub use storage::CatalogStorage;
pub use types::*;

use crate::Result;
use async_trait::async_trait;

/// Catalog capability the try-on pipeline depends on.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn by_id(&self, product_id: &str) -> Result<Option<ProductSummary>>;
}

#[async_trait]
impl ProductLookup for CatalogStorage {
    async fn by_id(&self, product_id: &str) -> Result<Option<ProductSummary>> {
        Ok(self.get(product_id).await?.as_ref().map(ProductSummary::from))
    }
}
