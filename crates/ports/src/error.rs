use agora_core::OrderId;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by an [`crate::OrderRepository`] implementation.
///
/// Clone-able so a failure can be carried inside a partial match result
/// without losing the committed trades.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// Optimistic-lock conflict: the order's committed state no longer
    /// matches the caller's last-known state, the order is no longer
    /// active, or the requested fill would overfill it.
    #[error("concurrent modification on order {0}")]
    ConcurrentModification(OrderId),

    #[error("repository call timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Failure delivering a trade notification. Always non-fatal to matching.
#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    #[error("notification channel closed")]
    ChannelClosed,

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
