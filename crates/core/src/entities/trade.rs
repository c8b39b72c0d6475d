use crate::values::{Price, ProductId, Timestamp, TradeId, UserId, Volume};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An executed trade between a buyer and a seller.
///
/// Immutable once created: the engine only ever appends trades, never
/// updates or deletes them. A trade records the participants and the
/// product, not the orders it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub product_id: ProductId,
    pub price: Price,
    pub volume: Volume,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub created_at: Timestamp,
}

impl Trade {
    pub fn new(
        product_id: ProductId,
        price: Price,
        volume: Volume,
        buyer_id: UserId,
        seller_id: UserId,
        now: Timestamp,
    ) -> Self {
        Trade {
            id: TradeId::new_v4(),
            product_id,
            price,
            volume,
            buyer_id,
            seller_id,
            created_at: now,
        }
    }

    /// Notional value of the trade (price * volume)
    pub fn notional(&self) -> Decimal {
        self.price.inner() * self.volume.inner()
    }
}

impl PartialEq for Trade {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Trade {}

impl std::hash::Hash for Trade {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
