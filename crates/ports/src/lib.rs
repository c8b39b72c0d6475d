//! Agora Ports
//!
//! Port definitions (traits) for the Agora matching engine.
//! These define the boundaries between the engine and its collaborators:
//! order storage, the product catalog, trade notification, and time.

mod catalog;
mod clock;
mod error;
mod notifier;
mod repository;

pub use catalog::ProductCatalog;
pub use clock::Clock;
pub use error::{NotifyError, RepositoryError, RepositoryResult};
pub use notifier::{Notifier, TradeNotification};
pub use repository::OrderRepository;
