use crate::entities::Side;
use crate::values::{OrderId, Price, ProductId, Timestamp, UserId, Volume};
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Transitions are monotonic forward only: an order never un-fills, and a
/// terminal order (`Filled` or `Cancelled`) is never mutated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    /// Status as a pure function of `(filled, volume)`.
    ///
    /// `filled == 0` → Pending, `0 < filled < volume` → PartiallyFilled,
    /// `filled == volume` → Filled. Cancellation is the only transition
    /// outside this rule and is applied explicitly.
    pub fn derive(filled: Volume, volume: Volume) -> OrderStatus {
        if filled.is_zero() {
            OrderStatus::Pending
        } else if filled < volume {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Filled
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::PartiallyFilled)
    }
}

/// A limit order resting in or entering the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub owner_id: UserId,
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
    pub filled: Volume,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Create a new pending order with an explicit timestamp.
    pub fn new(
        product_id: ProductId,
        owner_id: UserId,
        side: Side,
        price: Price,
        volume: Volume,
        now: Timestamp,
    ) -> Self {
        Order {
            id: OrderId::new_v4(),
            product_id,
            owner_id,
            side,
            price,
            volume,
            filled: Volume::ZERO,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Volume still available to match.
    pub fn remaining(&self) -> Volume {
        self.volume.saturating_sub(self.filled)
    }

    pub fn is_filled(&self) -> bool {
        self.filled >= self.volume
    }

    /// Apply an incremental fill and re-derive the status.
    ///
    /// Callers must not exceed the remaining volume; the repository enforces
    /// this at the persistence boundary.
    pub fn apply_fill(&mut self, fill: Volume, now: Timestamp) {
        self.filled = self.filled + fill;
        self.status = OrderStatus::derive(self.filled, self.volume);
        self.updated_at = now;
    }

    /// Cancel the order. Legal only while active; a terminal order is left
    /// untouched.
    pub fn cancel(&mut self, now: Timestamp) {
        if self.status.is_active() {
            self.status = OrderStatus::Cancelled;
            self.updated_at = now;
        }
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

impl std::hash::Hash for Order {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order(volume: rust_decimal::Decimal) -> Order {
        Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Side::Buy,
            Price::from(dec!(10)),
            Volume::from(volume),
            Utc::now(),
        )
    }

    #[test]
    fn status_derivation() {
        let volume = Volume::from(dec!(100));
        assert_eq!(
            OrderStatus::derive(Volume::ZERO, volume),
            OrderStatus::Pending
        );
        assert_eq!(
            OrderStatus::derive(Volume::from(dec!(40)), volume),
            OrderStatus::PartiallyFilled
        );
        assert_eq!(
            OrderStatus::derive(Volume::from(dec!(100)), volume),
            OrderStatus::Filled
        );
    }

    #[test]
    fn fill_moves_status_forward() {
        let mut order = order(dec!(100));
        let now = Utc::now();

        order.apply_fill(Volume::from(dec!(40)), now);
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), Volume::from(dec!(60)));

        order.apply_fill(Volume::from(dec!(60)), now);
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.remaining().is_zero());
    }

    #[test]
    fn cancel_only_while_active() {
        let now = Utc::now();

        let mut open = order(dec!(10));
        open.cancel(now);
        assert_eq!(open.status, OrderStatus::Cancelled);

        let mut filled = order(dec!(10));
        filled.apply_fill(Volume::from(dec!(10)), now);
        filled.cancel(now);
        assert_eq!(filled.status, OrderStatus::Filled);
    }
}
