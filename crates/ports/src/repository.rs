use agora_core::{Order, OrderId, Price, ProductId, Side, Trade, UserId, Volume};
use async_trait::async_trait;

use crate::error::RepositoryResult;

/// Repository contract consumed by the matching engine.
///
/// The engine assumes only these atomic semantics, never a specific storage
/// technology. Implementations must uphold the ordering guarantee of
/// [`find_resting_orders`](OrderRepository::find_resting_orders) and the
/// compare-and-swap semantics of [`apply_fill`](OrderRepository::apply_fill);
/// everything else in the engine is built on those two properties.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a newly created order (status `Pending`).
    async fn insert(&self, order: Order) -> RepositoryResult<Order>;

    /// Fetch the current committed state of an order.
    async fn get(&self, order_id: OrderId) -> RepositoryResult<Option<Order>>;

    /// Resting orders eligible to match a taker on `taker_side` at
    /// `limit_price`: active orders for the product on the opposite side
    /// whose price satisfies the crossing condition, excluding those owned
    /// by `exclude_owner`.
    ///
    /// Ordering: best price first (ascending when the taker buys,
    /// descending when the taker sells), ties broken by ascending creation
    /// time (strict FIFO among equal prices).
    async fn find_resting_orders(
        &self,
        product_id: ProductId,
        taker_side: Side,
        limit_price: Price,
        exclude_owner: UserId,
    ) -> RepositoryResult<Vec<Order>>;

    /// Atomically increment `filled` by `fill` and re-derive the status.
    ///
    /// Fails with [`RepositoryError::ConcurrentModification`] when the
    /// committed `filled` differs from `expected_filled`, when the order is
    /// no longer active, or when the increment would exceed the order's
    /// volume.
    ///
    /// [`RepositoryError::ConcurrentModification`]: crate::RepositoryError::ConcurrentModification
    async fn apply_fill(
        &self,
        order_id: OrderId,
        fill: Volume,
        expected_filled: Volume,
    ) -> RepositoryResult<Order>;

    /// Persist a new immutable trade.
    async fn record_trade(
        &self,
        product_id: ProductId,
        price: Price,
        volume: Volume,
        buyer_id: UserId,
        seller_id: UserId,
    ) -> RepositoryResult<Trade>;

    /// Forward-only transition to `Cancelled`. Fails with
    /// `ConcurrentModification` on an order that is already terminal.
    async fn mark_cancelled(&self, order_id: OrderId) -> RepositoryResult<Order>;

    /// All orders belonging to a user, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> RepositoryResult<Vec<Order>>;

    /// All trades for a product, newest first.
    async fn trades_for_product(&self, product_id: ProductId) -> RepositoryResult<Vec<Trade>>;

    /// All trades a user participated in, newest first.
    async fn trades_for_user(&self, user_id: UserId) -> RepositoryResult<Vec<Trade>>;
}
