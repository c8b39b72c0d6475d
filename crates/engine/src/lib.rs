//! Agora Engine
//!
//! The order matching engine for the Agora peer-to-peer commodity
//! marketplace, wired for per-product serialized processing.
//!
//! # Architecture
//!
//! - **Intake**: validates a new order, persists it as `PENDING`, and hands
//!   it to its product's worker (`OrderIntake`).
//! - **Processors**: one sequential worker per product owns the right to
//!   run matching for that product; submissions and cancels are enqueued
//!   and processed strictly one at a time (`ProductRouter`, `ProductWorker`).
//! - **Matching**: the price-time priority fill loop lives in
//!   `agora-matching` and talks to storage only through the repository port.
//! - **Infrastructure**: in-memory implementations of the ports
//!   (`InMemoryOrderStore`, `InMemoryProductCatalog`, `BroadcastNotifier`)
//!   plus clocks and configuration.
//!
//! # Example
//!
//! ```ignore
//! use agora_engine::{EngineConfig, Marketplace, PlaceOrderCommand};
//! use agora_core::Side;
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() {
//!     let market = Marketplace::new(EngineConfig::with_default_products());
//!     let product = market.products().await[0].clone();
//!
//!     let result = market
//!         .place_order(PlaceOrderCommand {
//!             product_id: product.id,
//!             owner_id: uuid::Uuid::new_v4(),
//!             side: Side::Buy,
//!             price: dec!(12.50),
//!             volume: dec!(100),
//!         })
//!         .await
//!         .unwrap();
//!
//!     println!("{} trade(s), {} remaining", result.trades.len(), result.remaining);
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod intake;
pub mod notifier;
pub mod processor;
pub mod repository;

// Re-export commonly used types
pub use clock::{ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig, ProductConfig};
pub use error::{EngineError, Result};
pub use intake::{MatchCompletion, OrderIntake, PlaceOrderCommand, PlaceOrderResult};
pub use notifier::BroadcastNotifier;
pub use processor::{ProductRouter, ProductWorker, WorkerHandle};
pub use repository::{InMemoryOrderStore, InMemoryProductCatalog};

// Outcome types surfaced from the matching crate
pub use agora_matching::{MatchError, MatchOutcome};

use agora_core::{Order, OrderId, Product, ProductId, Trade, UserId};
use agora_ports::{Clock, TradeNotification};
use std::sync::Arc;
use tokio::sync::broadcast;

/// The assembled marketplace engine
///
/// Wires configuration, clock, storage, catalog, notifier, and the
/// per-product routers into one entry point. The boundary is purely
/// programmatic; callers embed this behind whatever surface they expose.
pub struct Marketplace<C: Clock + 'static> {
    pub config: EngineConfig,
    pub clock: Arc<C>,
    pub order_store: Arc<InMemoryOrderStore>,
    pub catalog: Arc<InMemoryProductCatalog>,
    pub notifier: Arc<BroadcastNotifier>,
    router: Arc<ProductRouter<InMemoryOrderStore, BroadcastNotifier>>,
    intake: OrderIntake<InMemoryOrderStore, InMemoryProductCatalog, BroadcastNotifier>,
}

impl<C: Clock + 'static> Marketplace<C> {
    /// Create a new marketplace with the given clock
    pub fn with_clock(config: EngineConfig, clock: Arc<C>) -> Self {
        let clock_dyn: Arc<dyn Clock> = Arc::clone(&clock) as Arc<dyn Clock>;

        let order_store = Arc::new(InMemoryOrderStore::new(Arc::clone(&clock_dyn)));
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let notifier = Arc::new(BroadcastNotifier::new(config.notification_capacity));

        for product_config in &config.products {
            catalog.insert(product_config.to_product(clock_dyn.now()));
        }

        let router = Arc::new(ProductRouter::new(
            Arc::clone(&order_store),
            Arc::clone(&notifier),
            config.repository_timeout(),
            config.command_buffer,
        ));

        let intake = OrderIntake::new(
            clock_dyn,
            Arc::clone(&order_store),
            Arc::clone(&catalog),
            Arc::clone(&router),
        );

        Marketplace {
            config,
            clock,
            order_store,
            catalog,
            notifier,
            router,
            intake,
        }
    }

    /// Place a new order and run it through matching
    pub async fn place_order(&self, command: PlaceOrderCommand) -> Result<PlaceOrderResult> {
        self.intake.place_order(command).await
    }

    /// Cancel a resting order on behalf of its owner
    pub async fn cancel_order(&self, order_id: OrderId, requested_by: UserId) -> Result<Order> {
        self.intake.cancel_order(order_id, requested_by).await
    }

    pub async fn order(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.intake.order(order_id).await
    }

    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        self.intake.orders_for_user(user_id).await
    }

    pub async fn trades_for_product(&self, product_id: ProductId) -> Result<Vec<Trade>> {
        self.intake.trades_for_product(product_id).await
    }

    pub async fn trades_for_user(&self, user_id: UserId) -> Result<Vec<Trade>> {
        self.intake.trades_for_user(user_id).await
    }

    pub async fn products(&self) -> Vec<Product> {
        self.intake.products().await
    }

    /// Register a product in the catalog
    pub async fn add_product(&self, product: Product) {
        self.catalog.insert(product);
    }

    /// Subscribe to all trade notifications
    pub fn subscribe(&self) -> broadcast::Receiver<TradeNotification> {
        self.notifier.subscribe()
    }

    /// Subscribe to trade notifications for one product
    pub fn subscribe_product(&self, product_id: ProductId) -> broadcast::Receiver<TradeNotification> {
        self.notifier.subscribe_product(product_id)
    }

    /// Shut down all product workers gracefully
    pub async fn shutdown(&self) {
        self.router.shutdown().await;
    }
}

impl Marketplace<SystemClock> {
    /// Create a new marketplace on the system clock
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }
}

impl Marketplace<ManualClock> {
    /// Create a marketplace on a manually advanced clock (for testing)
    pub fn fixed_time(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(ManualClock::new()))
    }
}
