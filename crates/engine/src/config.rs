//! Configuration for the matching engine
//!
//! Supports JSON configuration files for engine tuning and the seed
//! product catalog.

use agora_core::{Product, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Root configuration for the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Command queue depth per product worker
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Upper bound on a single repository call, in milliseconds
    #[serde(default = "default_repository_timeout_ms")]
    pub repository_timeout_ms: u64,

    /// Notification channel capacity
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,

    /// Products to seed the catalog with
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

fn default_command_buffer() -> usize {
    1024
}

fn default_repository_timeout_ms() -> u64 {
    5_000
}

fn default_notification_capacity() -> usize {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_buffer: default_command_buffer(),
            repository_timeout_ms: default_repository_timeout_ms(),
            notification_capacity: default_notification_capacity(),
            products: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Create with a default commodity catalog
    pub fn with_default_products() -> Self {
        let products = vec![
            ProductConfig::new("Crude Oil"),
            ProductConfig::new("Natural Gas"),
            ProductConfig::new("Wheat"),
            ProductConfig::new("Copper"),
            ProductConfig::new("Coffee"),
        ];

        Self {
            products,
            ..Default::default()
        }
    }

    pub fn repository_timeout(&self) -> Duration {
        Duration::from_millis(self.repository_timeout_ms)
    }
}

/// Product catalog entry (DTO for JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Convert to a domain product
    pub fn to_product(&self, now: Timestamp) -> Product {
        let mut product = Product::new(&self.name, now);
        product.description = self.description.clone();
        product
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config = EngineConfig::from_json(r#"{ "products": [{ "name": "Wheat" }] }"#).unwrap();
        assert_eq!(config.command_buffer, 1024);
        assert_eq!(config.repository_timeout_ms, 5_000);
        assert_eq!(config.products.len(), 1);
        assert_eq!(config.products[0].name, "Wheat");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn default_catalog_is_seeded() {
        let config = EngineConfig::with_default_products();
        assert!(config.products.iter().any(|p| p.name == "Crude Oil"));
    }
}
