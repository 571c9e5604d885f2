//! Batched Event Writer
//!
//! Decouples the high-frequency mutation path from the lower-frequency
//! analytical write path. Change events accumulate in an in-memory buffer;
//! when the buffer reaches the flush threshold, all buffered events are
//! written to the analytical store in one transaction, in arrival order.
//!
//! On flush failure the buffer is NOT cleared: the error is surfaced to the
//! caller and every subsequent append re-attempts the flush until one
//! succeeds (retry-by-resubmission, no backoff). The buffer is memory-only,
//! so a process crash before a flush loses the buffered events permanently;
//! this is the subsystem's accepted durability trade-off and shutdown does
//! not flush either.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use std::sync::Arc;
use stockroom_core::{ChangeEvent, EventError};
use tokio::sync::Mutex;

/// Buffer fill level beyond which an append triggers a flush.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 100;

// ============================================================================
// EVENT SINK TRAIT
// ============================================================================

/// Analytical store seam: one bulk transactional insert per call.
///
/// Either every event in the batch is persisted or none is.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn insert_batch(&self, events: &[ChangeEvent]) -> Result<(), EventError>;
}

// ============================================================================
// POSTGRES SINK
// ============================================================================

/// Event sink over the analytical Postgres pool, writing the append-only
/// `good_events` table.
pub struct PgEventSink {
    pool: Pool,
}

impl PgEventSink {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventSink for PgEventSink {
    async fn insert_batch(&self, events: &[ChangeEvent]) -> Result<(), EventError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| EventError::store(format!("failed to acquire connection: {e}")))?;

        let tx = conn
            .transaction()
            .await
            .map_err(|e| EventError::store(e.to_string()))?;

        let stmt = tx
            .prepare(
                "INSERT INTO good_events \
                 (id, project_id, name, description, priority, removed, event_time) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .await
            .map_err(|e| EventError::flush(e.to_string()))?;

        for event in events {
            if let Err(e) = tx
                .execute(
                    &stmt,
                    &[
                        &event.id,
                        &event.project_id,
                        &event.name,
                        &event.description,
                        &event.priority,
                        &event.removed,
                        &event.event_time,
                    ],
                )
                .await
            {
                if let Err(rb) = tx.rollback().await {
                    tracing::error!(error = %rb, "event batch rollback failed");
                }
                return Err(EventError::flush(e.to_string()));
            }
        }

        tx.commit()
            .await
            .map_err(|e| EventError::flush(e.to_string()))?;

        Ok(())
    }
}

// ============================================================================
// EVENT WRITER
// ============================================================================

/// Buffering writer in front of an [`EventSink`].
///
/// The buffer and its length are read-modify-written together, so the whole
/// append-and-maybe-flush sequence runs under a single mutex; concurrent
/// appends are serialized and events land in the buffer in arrival order.
pub struct EventWriter {
    sink: Arc<dyn EventSink>,
    buffer: Mutex<Vec<ChangeEvent>>,
    threshold: usize,
}

impl EventWriter {
    /// Create a writer flushing to `sink` once more than `threshold`
    /// events are buffered: the buffer fills to the threshold and the next
    /// append flushes everything, itself included.
    pub fn new(sink: Arc<dyn EventSink>, threshold: usize) -> Self {
        Self {
            sink,
            buffer: Mutex::new(Vec::new()),
            threshold,
        }
    }

    /// Buffer one event, flushing the whole buffer once it exceeds the
    /// threshold.
    ///
    /// On flush failure the buffered events are retained and the error is
    /// returned; the next append will include them in its flush attempt.
    pub async fn append(&self, event: ChangeEvent) -> Result<(), EventError> {
        let mut buffer = self.buffer.lock().await;
        buffer.push(event);

        if buffer.len() <= self.threshold {
            return Ok(());
        }

        tracing::debug!(buffered = buffer.len(), "flushing event buffer");
        self.sink.insert_batch(&buffer).await?;
        buffer.clear();
        Ok(())
    }

    /// Number of events currently buffered (unflushed).
    pub async fn buffered(&self) -> usize {
        self.buffer.lock().await.len()
    }
}
