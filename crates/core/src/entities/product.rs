use crate::values::{ProductId, Timestamp};
use serde::{Deserialize, Serialize};

/// A commodity in the marketplace catalog.
///
/// The catalog is fixed at configuration time; orders always reference an
/// existing product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

impl Product {
    pub fn new(name: impl Into<String>, now: Timestamp) -> Self {
        Product {
            id: ProductId::new_v4(),
            name: name.into(),
            description: None,
            created_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}
