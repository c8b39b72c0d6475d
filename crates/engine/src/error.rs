use agora_core::{OrderId, OrderStatus, ProductId};
use agora_ports::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Rejected before matching begins; no state was mutated.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("not authorized to act on this order")]
    NotOrderOwner,

    #[error("order cannot be cancelled in status {0:?}")]
    NotCancellable(OrderStatus),

    /// The product's processor is gone or its queue was dropped.
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
