//! Event Listener Background Task
//!
//! One long-lived task per process subscribes to the change-notification
//! topic and feeds the batched event writer. Messages are processed one at a
//! time, in receive order. Deserialization and buffering errors are logged
//! and the message is considered consumed — there is no redelivery.
//!
//! Shutdown is cooperative via a watch channel. Events that are buffered but
//! not yet flushed when the task exits are lost; that window is the event
//! subsystem's accepted trade-off and the listener does not force a final
//! flush.

use crate::events::EventWriter;
use crate::pubsub::{Message, PubSub, EVENT_TOPIC};
use std::sync::Arc;
use stockroom_core::{ChangeEvent, Good};
use tokio::sync::{broadcast, broadcast::error::RecvError, watch};

/// Subscriber that maps change notifications to analytical events.
pub struct EventListener {
    rx: broadcast::Receiver<Message>,
    writer: Arc<EventWriter>,
    shutdown: watch::Receiver<bool>,
}

impl EventListener {
    /// Subscribe to the bus. The subscription is taken here, not in
    /// [`run`](Self::run), so notifications published between construction
    /// and the spawned task's first poll are not lost.
    pub fn new(bus: &PubSub, writer: Arc<EventWriter>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            rx: bus.subscribe(),
            writer,
            shutdown,
        }
    }

    /// Run until the shutdown signal flips. Intended to be spawned once at
    /// startup.
    pub async fn run(mut self) {
        tracing::info!("event listener started");

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                received = self.rx.recv() => match received {
                    Ok(msg) => {
                        if msg.topic != EVENT_TOPIC {
                            continue;
                        }
                        self.consume(&msg.payload).await;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "event listener lagged, notifications dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        tracing::info!("event listener stopped");
    }

    /// Handle one message. Errors are logged, never retried: the message is
    /// consumed either way.
    async fn consume(&self, payload: &[u8]) {
        let good: Good = match serde_json::from_slice(payload) {
            Ok(good) => good,
            Err(e) => {
                tracing::error!(error = %e, "failed to deserialize change notification");
                return;
            }
        };

        let event = ChangeEvent::from_good(&good);
        if let Err(e) = self.writer.append(event).await {
            tracing::error!(error = %e, "failed to buffer change event");
        }
    }
}
