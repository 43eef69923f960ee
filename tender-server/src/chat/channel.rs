//! Per-order event fan-out
//!
//! ```text
//! Services ──▶ publish() ──┬──▶ firehose (all events)
//!                          └──▶ per-order channel (if subscribed)
//! ```
//!
//! Channels are lossy by design: a slow consumer observes
//! `RecvError::Lagged` and is expected to refetch state instead of
//! replaying the gap.

use std::sync::Arc;

use dashmap::DashMap;
use shared::event::MarketEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Default broadcast channel capacity
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Broadcast hub for engine events
///
/// One firehose channel carries every event; per-order channels are
/// created lazily on first subscription so idle orders cost nothing.
#[derive(Debug, Clone)]
pub struct ChannelHub {
    firehose: broadcast::Sender<MarketEvent>,
    orders: Arc<DashMap<u64, broadcast::Sender<MarketEvent>>>,
    capacity: usize,
    shutdown_token: CancellationToken,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (firehose, _) = broadcast::channel(capacity);
        Self {
            firehose,
            orders: Arc::new(DashMap::new()),
            capacity,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Subscribe to events of a single order
    pub fn subscribe(&self, order_id: u64) -> broadcast::Receiver<MarketEvent> {
        self.orders
            .entry(order_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe to every event
    pub fn subscribe_all(&self) -> broadcast::Receiver<MarketEvent> {
        self.firehose.subscribe()
    }

    /// Publish an event to the firehose and the order channel
    ///
    /// Events without subscribers are dropped; that is the normal case
    /// and not an error.
    pub fn publish(&self, event: MarketEvent) {
        if let Some(sender) = self.orders.get(&event.order_id()) {
            let _ = sender.send(event.clone());
        }
        let _ = self.firehose.send(event);
    }

    /// Number of orders with a live channel
    pub fn channel_count(&self) -> usize {
        self.orders.len()
    }

    /// Token observed by long-lived consumers
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Cancel all consumers watching the shutdown token
    pub fn shutdown(&self) {
        tracing::info!("Shutting down event hub");
        self.shutdown_token.cancel();
    }
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_order_channels_are_isolated() {
        let hub = ChannelHub::new();
        let mut rx_1 = hub.subscribe(1);
        let mut rx_2 = hub.subscribe(2);

        hub.publish(MarketEvent::OrderUpdated { order_id: 1 });

        let event = rx_1.recv().await.unwrap();
        assert_eq!(event.order_id(), 1);
        assert!(rx_2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_firehose_sees_every_order() {
        let hub = ChannelHub::new();
        let mut all = hub.subscribe_all();

        hub.publish(MarketEvent::OrderUpdated { order_id: 1 });
        hub.publish(MarketEvent::OrderUpdated { order_id: 2 });

        assert_eq!(all.recv().await.unwrap().order_id(), 1);
        assert_eq!(all.recv().await.unwrap().order_id(), 2);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let hub = ChannelHub::new();
        hub.publish(MarketEvent::OrderUpdated { order_id: 99 });
        assert_eq!(hub.channel_count(), 0);
    }
}
