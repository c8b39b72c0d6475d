use agora_core::{Order, OrderId, UserId};
use agora_matching::{MatchError, MatchOutcome};
use tokio::sync::oneshot;

use crate::error::EngineError;

/// Commands processed by a product worker, strictly one at a time.
#[derive(Debug)]
pub enum ProductCommand {
    /// Match a newly persisted order against the book
    SubmitOrder {
        order: Order,
        reply: oneshot::Sender<Result<MatchOutcome, MatchError>>,
    },

    /// Cancel a resting order
    ///
    /// Routed through the same worker as matching so a cancel can never
    /// race an in-flight match on this product.
    CancelOrder {
        order_id: OrderId,
        requested_by: UserId,
        reply: oneshot::Sender<Result<Order, EngineError>>,
    },

    /// Stop the worker
    Shutdown,
}
