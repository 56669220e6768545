//! Application lifecycle notifications
//!
//! The host publishes foreground/background transitions on a
//! [`LifecycleBus`]. Subscribers hold a [`Subscription`] and drain it on their
//! own context; dropping the subscription unsubscribes.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Buffered events per subscriber before the oldest are dropped
const BUS_CAPACITY: usize = 32;

/// Foreground state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The application came to the foreground and accepts input
    BecameActive,
    /// The application lost the foreground
    ResignedActive,
}

/// Broadcast channel for lifecycle events
#[derive(Debug, Clone)]
pub struct LifecycleBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl LifecycleBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Publish an event to every live subscriber
    pub fn publish(&self, event: LifecycleEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a lifecycle subscription, released on drop
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<LifecycleEvent>,
}

impl Subscription {
    /// Next queued event without waiting
    ///
    /// Returns `None` when the queue is empty or the bus is gone. If this
    /// subscriber fell behind, the missed events are skipped.
    pub fn try_next(&mut self) -> Option<LifecycleEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!("Lifecycle subscriber lagged, {} events dropped", missed);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = LifecycleBus::new();
        let mut sub = bus.subscribe();

        bus.publish(LifecycleEvent::ResignedActive);
        bus.publish(LifecycleEvent::BecameActive);

        assert_eq!(sub.try_next(), Some(LifecycleEvent::ResignedActive));
        assert_eq!(sub.try_next(), Some(LifecycleEvent::BecameActive));
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = LifecycleBus::new();
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_lagging_subscriber_keeps_newest() {
        let bus = LifecycleBus::new();
        let mut sub = bus.subscribe();

        for _ in 0..BUS_CAPACITY + 5 {
            bus.publish(LifecycleEvent::ResignedActive);
        }
        bus.publish(LifecycleEvent::BecameActive);

        let mut last = None;
        while let Some(event) = sub.try_next() {
            last = Some(event);
        }
        assert_eq!(last, Some(LifecycleEvent::BecameActive));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = LifecycleBus::new();
        bus.publish(LifecycleEvent::BecameActive);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
