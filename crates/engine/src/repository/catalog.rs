use agora_core::{Product, ProductId};
use agora_ports::ProductCatalog;
use async_trait::async_trait;
use dashmap::DashMap;

/// In-memory product catalog
pub struct InMemoryProductCatalog {
    products: DashMap<ProductId, Product>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        InMemoryProductCatalog {
            products: DashMap::new(),
        }
    }

    /// Synchronous insert, used during wiring before the engine runs.
    pub fn insert(&self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Look a product up by name (diagnostics and tests)
    pub fn get_by_name(&self, name: &str) -> Option<Product> {
        self.products
            .iter()
            .find(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for InMemoryProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get(&self, product_id: ProductId) -> Option<Product> {
        self.products.get(&product_id).map(|p| p.value().clone())
    }

    async fn add(&self, product: Product) {
        self.insert(product);
    }

    async fn list(&self) -> Vec<Product> {
        self.products
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
