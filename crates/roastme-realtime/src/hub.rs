//! Session hub: one broadcast channel per live link.

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use roastme_core::types::LinkId;
use roastme_entity::link::ClosedReason;

use crate::event::SessionEvent;

/// Registry of per-session broadcast channels.
///
/// Holds no session state of its own: it only forwards events, and a
/// channel exists only while someone is subscribed or it is being used.
#[derive(Debug)]
pub struct SessionHub {
    /// Link ID → sender.
    channels: DashMap<LinkId, broadcast::Sender<SessionEvent>>,
    /// Buffer size for new channels.
    capacity: usize,
}

impl SessionHub {
    /// Creates a hub whose channels buffer `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes to a session's events.
    pub fn subscribe(&self, link_id: &LinkId) -> broadcast::Receiver<SessionEvent> {
        self.channels
            .entry(link_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publishes an event. Returns the number of subscribers reached.
    pub fn publish(&self, link_id: &LinkId, event: SessionEvent) -> usize {
        let delivered = match self.channels.get(link_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        };
        if delivered == 0 {
            self.channels
                .remove_if(link_id, |_, sender| sender.receiver_count() == 0);
        }
        delivered
    }

    /// Publishes `Closed` and drops the channel.
    ///
    /// Subscribers drain any buffered events, then see the channel close.
    pub fn close(&self, link_id: &LinkId, reason: ClosedReason) -> usize {
        let Some((_, sender)) = self.channels.remove(link_id) else {
            return 0;
        };
        let delivered = sender.send(SessionEvent::Closed { reason }).unwrap_or(0);
        debug!(link_id = %link_id, %reason, delivered, "Session channel closed");
        delivered
    }

    /// Drops the session's channel if nobody is listening on it.
    pub fn release_idle(&self, link_id: &LinkId) -> bool {
        self.channels
            .remove_if(link_id, |_, sender| sender.receiver_count() == 0)
            .is_some()
    }

    /// Returns subscriber count for a session.
    pub fn subscriber_count(&self, link_id: &LinkId) -> usize {
        self.channels
            .get(link_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Returns total number of open channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let hub = SessionHub::new(8);
        let id = LinkId::new("aaaaaaaa");
        let mut rx1 = hub.subscribe(&id);
        let mut rx2 = hub.subscribe(&id);
        assert_eq!(hub.subscriber_count(&id), 2);

        let event = SessionEvent::Left {
            codename: "spicy".to_string(),
        };
        assert_eq!(hub.publish(&id, event.clone()), 2);
        assert_eq!(rx1.recv().await.unwrap(), event);
        assert_eq!(rx2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let hub = SessionHub::new(8);
        let id = LinkId::new("aaaaaaaa");
        let delivered = hub.publish(
            &id,
            SessionEvent::Left {
                codename: "x".to_string(),
            },
        );
        assert_eq!(delivered, 0);
        assert_eq!(hub.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_receivers_release_channel() {
        let hub = SessionHub::new(8);
        let id = LinkId::new("aaaaaaaa");
        drop(hub.subscribe(&id));
        assert_eq!(hub.channel_count(), 1);
        hub.publish(
            &id,
            SessionEvent::Left {
                codename: "x".to_string(),
            },
        );
        assert_eq!(hub.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_close_ends_stream() {
        let hub = SessionHub::new(8);
        let id = LinkId::new("aaaaaaaa");
        let mut rx = hub.subscribe(&id);

        assert_eq!(hub.close(&id, ClosedReason::Revoked), 1);
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::Closed {
                reason: ClosedReason::Revoked
            }
        );
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
        assert_eq!(hub.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_release_idle_keeps_listened_channels() {
        let hub = SessionHub::new(8);
        let id = LinkId::new("aaaaaaaa");
        let rx = hub.subscribe(&id);
        assert!(!hub.release_idle(&id));
        assert_eq!(hub.channel_count(), 1);

        drop(rx);
        assert!(hub.release_idle(&id));
        assert_eq!(hub.channel_count(), 0);
        assert!(!hub.release_idle(&id));
    }
}
