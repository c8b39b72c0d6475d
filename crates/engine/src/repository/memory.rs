use agora_core::{Order, OrderId, Price, ProductId, Side, Trade, UserId, Volume};
use agora_ports::{Clock, OrderRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// In-memory order and trade storage
///
/// Thread-safe storage using DashMap; each order mutation happens under the
/// entry's exclusive guard, which is what gives `apply_fill` its atomic
/// compare-and-swap semantics. Suitable for simulation and testing.
pub struct InMemoryOrderStore {
    orders: DashMap<OrderId, Order>,
    trades: RwLock<Vec<Trade>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryOrderStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        InMemoryOrderStore {
            orders: DashMap::new(),
            trades: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Number of stored orders (diagnostics)
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of recorded trades (diagnostics)
    pub fn trade_count(&self) -> usize {
        self.trades.read().len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> RepositoryResult<Order> {
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, order_id: OrderId) -> RepositoryResult<Option<Order>> {
        Ok(self.orders.get(&order_id).map(|o| o.value().clone()))
    }

    async fn find_resting_orders(
        &self,
        product_id: ProductId,
        taker_side: Side,
        limit_price: Price,
        exclude_owner: UserId,
    ) -> RepositoryResult<Vec<Order>> {
        let resting_side = taker_side.opposite();
        let mut candidates: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.product_id == product_id
                    && order.side == resting_side
                    && order.status.is_active()
                    && order.owner_id != exclude_owner
                    && taker_side.crosses(limit_price, order.price)
            })
            .map(|entry| entry.value().clone())
            .collect();

        // Best price first, then strict FIFO among equal prices.
        candidates.sort_by(|a, b| {
            let by_price = match taker_side {
                Side::Buy => a.price.cmp(&b.price),
                Side::Sell => b.price.cmp(&a.price),
            };
            by_price.then(a.created_at.cmp(&b.created_at))
        });

        Ok(candidates)
    }

    async fn apply_fill(
        &self,
        order_id: OrderId,
        fill: Volume,
        expected_filled: Volume,
    ) -> RepositoryResult<Order> {
        let mut entry = self
            .orders
            .get_mut(&order_id)
            .ok_or(RepositoryError::OrderNotFound(order_id))?;

        let order = entry.value_mut();
        if !order.status.is_active()
            || order.filled != expected_filled
            || order.filled + fill > order.volume
        {
            return Err(RepositoryError::ConcurrentModification(order_id));
        }

        order.apply_fill(fill, self.clock.now());
        Ok(order.clone())
    }

    async fn record_trade(
        &self,
        product_id: ProductId,
        price: Price,
        volume: Volume,
        buyer_id: UserId,
        seller_id: UserId,
    ) -> RepositoryResult<Trade> {
        let trade = Trade::new(
            product_id,
            price,
            volume,
            buyer_id,
            seller_id,
            self.clock.now(),
        );
        self.trades.write().push(trade.clone());
        Ok(trade)
    }

    async fn mark_cancelled(&self, order_id: OrderId) -> RepositoryResult<Order> {
        let mut entry = self
            .orders
            .get_mut(&order_id)
            .ok_or(RepositoryError::OrderNotFound(order_id))?;

        let order = entry.value_mut();
        if !order.status.is_active() {
            return Err(RepositoryError::ConcurrentModification(order_id));
        }

        order.cancel(self.clock.now());
        Ok(order.clone())
    }

    async fn orders_for_user(&self, user_id: UserId) -> RepositoryResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.value().owner_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn trades_for_product(&self, product_id: ProductId) -> RepositoryResult<Vec<Trade>> {
        let mut trades: Vec<Trade> = self
            .trades
            .read()
            .iter()
            .filter(|t| t.product_id == product_id)
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trades)
    }

    async fn trades_for_user(&self, user_id: UserId) -> RepositoryResult<Vec<Trade>> {
        let mut trades: Vec<Trade> = self
            .trades
            .read()
            .iter()
            .filter(|t| t.buyer_id == user_id || t.seller_id == user_id)
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trades)
    }
}
