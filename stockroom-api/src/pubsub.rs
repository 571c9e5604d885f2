//! Change Notification Pub/Sub
//!
//! In-process topic carrying serialized post-mutation entity state from the
//! interactor to the event listener. Built on a tokio broadcast channel:
//! delivery is at-least-once-attempted and unordered across publishers, with
//! no redelivery — the same contract the service assumes of an external
//! message bus.

use thiserror::Error;
use tokio::sync::broadcast;

/// Topic name the goods interactor publishes change notifications on.
pub const EVENT_TOPIC: &str = "goods.events";

/// A notification could not be handed to any subscriber.
///
/// The listener subscribes before its task is spawned, so in a running
/// service this means the listener is gone. Callers on the mutation path
/// treat it as a soft failure: the write stands, the event is lost.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no live subscribers for topic {topic}")]
pub struct PublishError {
    pub topic: &'static str,
}

/// A message carried on the bus: topic plus opaque payload bytes.
#[derive(Debug, Clone)]
pub struct Message {
    pub topic: &'static str,
    pub payload: Vec<u8>,
}

/// Publish/subscribe handle shared across the application.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Clone)]
pub struct PubSub {
    tx: broadcast::Sender<Message>,
}

impl PubSub {
    /// Create a bus with the given buffer capacity.
    ///
    /// The capacity bounds how many messages a slow subscriber may lag
    /// behind before it starts missing messages.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a payload onto a topic, fire-and-forget.
    ///
    /// A send with no live subscribers drops the message and reports
    /// [`PublishError`] so the caller can record the loss.
    pub fn publish(&self, topic: &'static str, payload: Vec<u8>) -> Result<(), PublishError> {
        match self.tx.send(Message { topic, payload }) {
            Ok(receivers) => {
                tracing::debug!(topic, receivers, "published change notification");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(topic, "change notification dropped: no live subscribers");
                Err(PublishError { topic })
            }
        }
    }

    /// Subscribe to the bus. The receiver sees every message published
    /// after this call, on any topic; subscribers filter by `Message::topic`.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_reports_the_loss() {
        let bus = PubSub::new(8);
        let err = bus.publish(EVENT_TOPIC, b"payload".to_vec()).unwrap_err();
        assert_eq!(err, PublishError { topic: EVENT_TOPIC });
    }

    #[tokio::test]
    async fn subscriber_receives_published_payload() {
        let bus = PubSub::new(8);
        let mut rx = bus.subscribe();

        bus.publish(EVENT_TOPIC, b"hello".to_vec()).unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, EVENT_TOPIC);
        assert_eq!(msg.payload, b"hello".to_vec());
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_messages() {
        let bus = PubSub::new(8);
        assert!(bus.publish(EVENT_TOPIC, b"early".to_vec()).is_err());

        let mut rx = bus.subscribe();
        bus.publish(EVENT_TOPIC, b"late".to_vec()).unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.payload, b"late".to_vec());
    }
}
