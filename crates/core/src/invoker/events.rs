//! Event delivery from a running batch.

use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::{BatchEvent, BatchEventEnvelope};

/// Handle a running batch uses to notify its observer.
///
/// Cheaply cloneable. Sends wait for channel capacity, so a slow observer
/// slows the batch down instead of losing events. If the receiver is gone
/// the event is dropped and the batch carries on.
#[derive(Clone)]
pub struct EventSink {
    batch_id: Uuid,
    tx: mpsc::Sender<BatchEventEnvelope>,
}

impl EventSink {
    pub fn new(batch_id: Uuid, tx: mpsc::Sender<BatchEventEnvelope>) -> Self {
        Self { batch_id, tx }
    }

    /// Creates a sink for a new batch id together with its receiving end.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<BatchEventEnvelope>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(Uuid::new_v4(), tx), rx)
    }

    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub async fn emit(&self, event: BatchEvent) {
        let envelope = BatchEventEnvelope {
            batch_id: self.batch_id,
            timestamp: Utc::now(),
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::debug!("Batch event dropped, observer is gone: {:?}", e.0.event);
        }
    }

    pub async fn progress(&self, percent: u8) {
        self.emit(BatchEvent::Progress { percent }).await;
    }

    pub async fn log(&self, line: impl Into<String>) {
        self.emit(BatchEvent::Log { line: line.into() }).await;
    }

    pub async fn completed(&self, files: usize) {
        self.emit(BatchEvent::Completed { files }).await;
    }
}
