use agora_core::ProductId;
use agora_ports::{Notifier, NotifyError, TradeNotification};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

/// Broadcast-based trade notifier
///
/// Uses tokio broadcast channels to deliver trade notifications to any
/// number of subscribers, globally or per product. Delivery is decoupled
/// from matching: the engine never waits on a subscriber, and an absent
/// subscriber is not an error.
pub struct BroadcastNotifier {
    /// Global channel receiving every notification
    global_tx: broadcast::Sender<TradeNotification>,
    /// Per-product channels
    product_channels: Arc<DashMap<ProductId, broadcast::Sender<TradeNotification>>>,
    /// Subscriber count
    subscriber_count: Arc<AtomicUsize>,
    /// Channel capacity
    capacity: usize,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (global_tx, _) = broadcast::channel(capacity);

        BroadcastNotifier {
            global_tx,
            product_channels: Arc::new(DashMap::new()),
            subscriber_count: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// Subscribe to all trade notifications
    pub fn subscribe(&self) -> broadcast::Receiver<TradeNotification> {
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);
        self.global_tx.subscribe()
    }

    /// Subscribe to notifications for a specific product
    pub fn subscribe_product(&self, product_id: ProductId) -> broadcast::Receiver<TradeNotification> {
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);

        let entry = self.product_channels.entry(product_id).or_insert_with(|| {
            let (tx, _) = broadcast::channel(self.capacity);
            tx
        });

        entry.value().subscribe()
    }

    /// Unsubscribe (decrement counter)
    pub fn unsubscribe(&self) {
        self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl Clone for BroadcastNotifier {
    fn clone(&self) -> Self {
        BroadcastNotifier {
            global_tx: self.global_tx.clone(),
            product_channels: Arc::clone(&self.product_channels),
            subscriber_count: Arc::clone(&self.subscriber_count),
            capacity: self.capacity,
        }
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn notify(&self, notification: TradeNotification) -> Result<(), NotifyError> {
        // Ignore send errors (no subscribers)
        let product_id = notification.trade.product_id;
        let _ = self.global_tx.send(notification.clone());

        if let Some(tx) = self.product_channels.get(&product_id) {
            let _ = tx.send(notification);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{Price, Trade, Volume};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn notification(product_id: ProductId) -> TradeNotification {
        let trade = Trade::new(
            product_id,
            Price::from(dec!(10)),
            Volume::from(dec!(5)),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc::now(),
        );
        TradeNotification::new(trade, "Wheat")
    }

    #[tokio::test]
    async fn subscribe_and_receive() {
        let notifier = BroadcastNotifier::new(100);
        let mut rx = notifier.subscribe();

        let sent = notification(Uuid::new_v4());
        notifier.notify(sent.clone()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.trade.id, sent.trade.id);
        assert_eq!(received.product_name, "Wheat");
    }

    #[tokio::test]
    async fn product_subscription_is_isolated() {
        let notifier = BroadcastNotifier::new(100);
        let wheat = Uuid::new_v4();
        let copper = Uuid::new_v4();

        let mut wheat_rx = notifier.subscribe_product(wheat);
        let mut copper_rx = notifier.subscribe_product(copper);

        notifier.notify(notification(wheat)).await.unwrap();

        assert!(wheat_rx.try_recv().is_ok());
        assert!(copper_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn notify_without_subscribers_is_not_an_error() {
        let notifier = BroadcastNotifier::new(100);
        assert!(notifier.notify(notification(Uuid::new_v4())).await.is_ok());
    }
}
