use agora_core::{Product, ProductId};
use async_trait::async_trait;

/// The fixed product catalog orders are validated against.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get(&self, product_id: ProductId) -> Option<Product>;

    async fn add(&self, product: Product);

    async fn list(&self) -> Vec<Product>;
}
