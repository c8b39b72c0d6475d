use agora_core::{Order, OrderId, Product, ProductId, UserId};
use agora_matching::{MatchError, MatchOutcome};
use agora_ports::{Notifier, OrderRepository};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use super::worker::{ProductWorker, WorkerHandle};
use crate::error::EngineError;

/// Routes commands to per-product workers, spawning them on first use.
///
/// One worker per product is the serialization unit: any number of orders
/// may be submitted concurrently for the same product and they are matched
/// strictly one at a time, while different products run fully in parallel.
pub struct ProductRouter<R, N> {
    workers: DashMap<ProductId, WorkerHandle>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    repository: Arc<R>,
    notifier: Arc<N>,
    call_timeout: Duration,
    command_buffer: usize,
}

impl<R, N> ProductRouter<R, N>
where
    R: OrderRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        call_timeout: Duration,
        command_buffer: usize,
    ) -> Self {
        ProductRouter {
            workers: DashMap::new(),
            tasks: Mutex::new(Vec::new()),
            repository,
            notifier,
            call_timeout,
            command_buffer,
        }
    }

    /// Get the worker for a product, spawning it on first use.
    fn handle_for(&self, product: &Product) -> WorkerHandle {
        if let Some(handle) = self.workers.get(&product.id) {
            return handle.value().clone();
        }

        let entry = self.workers.entry(product.id).or_insert_with(|| {
            let (handle, task) = ProductWorker::spawn(
                product.clone(),
                Arc::clone(&self.repository),
                Arc::clone(&self.notifier),
                self.call_timeout,
                self.command_buffer,
            );
            self.tasks.lock().push(task);
            handle
        });

        entry.value().clone()
    }

    /// Submit an order for matching on its product's worker.
    pub async fn submit(
        &self,
        product: &Product,
        order: Order,
    ) -> Result<Result<MatchOutcome, MatchError>, EngineError> {
        self.handle_for(product).submit(order).await
    }

    /// Cancel an order through its product's worker.
    pub async fn cancel(
        &self,
        product: &Product,
        order_id: OrderId,
        requested_by: UserId,
    ) -> Result<Order, EngineError> {
        self.handle_for(product).cancel(order_id, requested_by).await
    }

    /// Number of live product workers
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Shut all workers down gracefully and wait for them to finish.
    pub async fn shutdown(&self) {
        for entry in self.workers.iter() {
            entry.value().shutdown().await;
        }
        self.workers.clear();

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            let _ = task.await;
        }

        info!("product router shutdown complete");
    }
}
