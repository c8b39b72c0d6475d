use agora_core::{Trade, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Event delivered to both counterparties after a trade executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeNotification {
    pub trade: Trade,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub product_name: String,
}

impl TradeNotification {
    pub fn new(trade: Trade, product_name: impl Into<String>) -> Self {
        let buyer_id = trade.buyer_id;
        let seller_id = trade.seller_id;
        TradeNotification {
            trade,
            buyer_id,
            seller_id,
            product_name: product_name.into(),
        }
    }
}

/// Fire-and-forget delivery of trade events to counterparties.
///
/// Engine correctness never depends on notification success or ordering;
/// failures may be logged but must not propagate into matching.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: TradeNotification) -> Result<(), NotifyError>;
}
