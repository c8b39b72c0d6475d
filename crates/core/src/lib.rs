//! Agora Core Domain
//!
//! Pure domain types for the Agora commodity marketplace.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Order, OrderStatus, Product, Side, Trade};
pub use values::{OrderId, Price, ProductId, Timestamp, TradeId, UserId, Volume};
