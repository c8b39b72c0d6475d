use agora_core::{Order, OrderId, Price, Product, ProductId, Side, Trade, UserId, Volume};
use agora_ports::{Clock, Notifier, OrderRepository, ProductCatalog};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::processor::ProductRouter;

/// Request to place a new limit order.
#[derive(Debug, Clone)]
pub struct PlaceOrderCommand {
    pub product_id: ProductId,
    pub owner_id: UserId,
    pub side: Side,
    pub price: Decimal,
    pub volume: Decimal,
}

/// Whether the match attempt ran to completion.
///
/// `Complete` means every crossing candidate was considered, not that the
/// order fully filled; an order with remaining volume simply rests in the
/// book. `Incomplete` means matching halted early and the order may be
/// matched further by a later submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchCompletion {
    Complete,
    Incomplete { reason: String },
}

/// Outcome of a submission, relayed to the caller.
#[derive(Debug, Clone)]
pub struct PlaceOrderResult {
    /// Final committed state of the submitted order
    pub order: Order,
    /// Trades executed by this submission, in execution order
    pub trades: Vec<Trade>,
    /// Volume left resting in the book
    pub remaining: Volume,
    pub completion: MatchCompletion,
}

/// Thin orchestration in front of the matching engine: validates a new
/// order, persists it, and hands it to its product's serialized worker.
pub struct OrderIntake<R, P, N> {
    clock: Arc<dyn Clock>,
    repository: Arc<R>,
    catalog: Arc<P>,
    router: Arc<ProductRouter<R, N>>,
}

impl<R, P, N> OrderIntake<R, P, N>
where
    R: OrderRepository + 'static,
    P: ProductCatalog,
    N: Notifier + 'static,
{
    pub fn new(
        clock: Arc<dyn Clock>,
        repository: Arc<R>,
        catalog: Arc<P>,
        router: Arc<ProductRouter<R, N>>,
    ) -> Self {
        OrderIntake {
            clock,
            repository,
            catalog,
            router,
        }
    }

    /// Validate, persist, and match a new order.
    ///
    /// Validation failures reject the submission before any state is
    /// mutated. A repository failure mid-match surfaces as
    /// [`MatchCompletion::Incomplete`]; trades committed up to that point
    /// stand and are returned.
    pub async fn place_order(&self, command: PlaceOrderCommand) -> Result<PlaceOrderResult> {
        let price =
            Price::new(command.price).map_err(|e| EngineError::Validation(e.to_string()))?;
        let volume =
            Volume::new(command.volume).map_err(|e| EngineError::Validation(e.to_string()))?;

        let product = self
            .catalog
            .get(command.product_id)
            .await
            .ok_or(EngineError::ProductNotFound(command.product_id))?;

        let order = Order::new(
            product.id,
            command.owner_id,
            command.side,
            price,
            volume,
            self.clock.now(),
        );
        let order = self.repository.insert(order).await?;

        info!(
            order_id = %order.id,
            product = %product.name,
            side = %order.side,
            price = %order.price,
            volume = %order.volume,
            "order placed"
        );

        let reply = self.router.submit(&product, order.clone()).await?;
        let (outcome, completion) = match reply {
            Ok(outcome) => (outcome, MatchCompletion::Complete),
            Err(err) => {
                let (outcome, reason) = err.into_outcome();
                warn!(order_id = %order.id, reason = %reason, "matching incomplete");
                (outcome, MatchCompletion::Incomplete { reason })
            }
        };

        // Re-read the final committed state; if the repository is unhealthy
        // at this point, fall back to the submitted snapshot rather than
        // discarding the committed trades.
        let final_order = match self.repository.get(order.id).await {
            Ok(Some(updated)) => updated,
            _ => order,
        };

        Ok(PlaceOrderResult {
            order: final_order,
            trades: outcome.trades,
            remaining: outcome.remaining,
            completion,
        })
    }

    /// Cancel a resting order on behalf of its owner.
    ///
    /// Serialized through the product's worker so the cancel cannot race an
    /// in-flight match on the same product.
    pub async fn cancel_order(&self, order_id: OrderId, requested_by: UserId) -> Result<Order> {
        let order = self
            .repository
            .get(order_id)
            .await?
            .ok_or(EngineError::OrderNotFound(order_id))?;

        if order.owner_id != requested_by {
            return Err(EngineError::NotOrderOwner);
        }

        let product = self
            .catalog
            .get(order.product_id)
            .await
            .ok_or(EngineError::ProductNotFound(order.product_id))?;

        self.router.cancel(&product, order_id, requested_by).await
    }

    pub async fn order(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.repository.get(order_id).await?)
    }

    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.repository.orders_for_user(user_id).await?)
    }

    pub async fn trades_for_product(&self, product_id: ProductId) -> Result<Vec<Trade>> {
        Ok(self.repository.trades_for_product(product_id).await?)
    }

    pub async fn trades_for_user(&self, user_id: UserId) -> Result<Vec<Trade>> {
        Ok(self.repository.trades_for_user(user_id).await?)
    }

    pub async fn products(&self) -> Vec<Product> {
        self.catalog.list().await
    }
}
