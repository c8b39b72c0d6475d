use agora_core::{Order, OrderId, Product, ProductId, UserId};
use agora_matching::{MatchError, MatchOutcome, MatchingEngine};
use agora_ports::{Notifier, OrderRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::command::ProductCommand;
use crate::error::EngineError;

/// Handle to the serialized processor that owns one product's book.
#[derive(Clone)]
pub struct WorkerHandle {
    product_id: ProductId,
    sender: mpsc::Sender<ProductCommand>,
}

impl WorkerHandle {
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Enqueue a match for this product and wait for its outcome.
    pub async fn submit(&self, order: Order) -> Result<Result<MatchOutcome, MatchError>, EngineError> {
        let (reply, response) = oneshot::channel();
        self.send(ProductCommand::SubmitOrder { order, reply })
            .await?;
        response
            .await
            .map_err(|_| EngineError::EngineUnavailable("product worker dropped reply".into()))
    }

    /// Enqueue a cancel for this product and wait for the result.
    pub async fn cancel(
        &self,
        order_id: OrderId,
        requested_by: UserId,
    ) -> Result<Order, EngineError> {
        let (reply, response) = oneshot::channel();
        self.send(ProductCommand::CancelOrder {
            order_id,
            requested_by,
            reply,
        })
        .await?;
        response
            .await
            .map_err(|_| EngineError::EngineUnavailable("product worker dropped reply".into()))?
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(ProductCommand::Shutdown).await;
    }

    async fn send(&self, command: ProductCommand) -> Result<(), EngineError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| EngineError::EngineUnavailable("product worker stopped".into()))
    }
}

/// Sequential processor owning the right to match one product.
///
/// All submissions and cancels for the product funnel through this worker's
/// queue and run strictly one at a time, each to completion. Candidate
/// search and fill application within one match are therefore race-free by
/// construction; submissions for different products proceed in parallel on
/// their own workers.
pub struct ProductWorker<R, N> {
    product: Product,
    repository: Arc<R>,
    engine: MatchingEngine<R, N>,
    receiver: mpsc::Receiver<ProductCommand>,
}

impl<R, N> ProductWorker<R, N>
where
    R: OrderRepository + 'static,
    N: Notifier + 'static,
{
    /// Spawn the worker task and return its handle.
    pub fn spawn(
        product: Product,
        repository: Arc<R>,
        notifier: Arc<N>,
        call_timeout: Duration,
        command_buffer: usize,
    ) -> (WorkerHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(command_buffer);

        let handle = WorkerHandle {
            product_id: product.id,
            sender,
        };

        let worker = ProductWorker {
            engine: MatchingEngine::new(Arc::clone(&repository), notifier, call_timeout),
            product,
            repository,
            receiver,
        };

        let task = tokio::spawn(worker.run());

        (handle, task)
    }

    /// Main loop: commands are processed in arrival order, to completion.
    async fn run(mut self) {
        info!(product = %self.product.name, product_id = %self.product.id, "product worker started");

        while let Some(command) = self.receiver.recv().await {
            match command {
                ProductCommand::SubmitOrder { order, reply } => {
                    debug!(order_id = %order.id, "processing submission");
                    let result = self.engine.match_order(&order, &self.product).await;
                    let _ = reply.send(result);
                }

                ProductCommand::CancelOrder {
                    order_id,
                    requested_by,
                    reply,
                } => {
                    let result = self.handle_cancel(order_id, requested_by).await;
                    let _ = reply.send(result);
                }

                ProductCommand::Shutdown => break,
            }
        }

        info!(product = %self.product.name, "product worker stopped");
    }

    async fn handle_cancel(
        &self,
        order_id: OrderId,
        requested_by: UserId,
    ) -> Result<Order, EngineError> {
        let order = self
            .repository
            .get(order_id)
            .await?
            .ok_or(EngineError::OrderNotFound(order_id))?;

        if order.owner_id != requested_by {
            return Err(EngineError::NotOrderOwner);
        }

        if !order.status.is_active() {
            return Err(EngineError::NotCancellable(order.status));
        }

        let cancelled = self.repository.mark_cancelled(order_id).await?;
        info!(order_id = %order_id, "order cancelled");
        Ok(cancelled)
    }
}
