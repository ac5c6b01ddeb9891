//! Single-batch-at-a-time launcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::batch::BatchInvoker;
use super::error::InvokerError;
use super::events::EventSink;
use super::types::{BatchEventEnvelope, BatchRequest};

/// Starts batches on a background task, refusing to start a second one
/// while the first is still running.
#[derive(Clone)]
pub struct BatchController {
    invoker: Arc<BatchInvoker>,
    running: Arc<AtomicBool>,
}

impl BatchController {
    pub fn new(invoker: BatchInvoker) -> Self {
        Self {
            invoker: Arc::new(invoker),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a batch is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Validates the request and starts it in the background.
    ///
    /// Returns immediately. Use the returned handle to receive events and to
    /// wait for the batch to finish.
    pub fn start(&self, request: BatchRequest) -> Result<BatchHandle, InvokerError> {
        request.validate()?;

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(InvokerError::BatchInProgress);
        }

        let (sink, events) = EventSink::channel(self.invoker.config().event_buffer);
        let batch_id = sink.batch_id();
        let invoker = Arc::clone(&self.invoker);
        let running = RunningGuard(Arc::clone(&self.running));

        let task = tokio::spawn(async move {
            let _running = running;
            invoker.run(request, &sink).await
        });

        Ok(BatchHandle {
            batch_id,
            events,
            task,
        })
    }
}

/// Clears the running flag when the batch task ends, panics included.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A batch running in the background.
pub struct BatchHandle {
    batch_id: Uuid,
    events: mpsc::Receiver<BatchEventEnvelope>,
    task: JoinHandle<Result<(), InvokerError>>,
}

impl BatchHandle {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    /// Next event from the batch, `None` once the batch task has ended and
    /// every event has been received.
    pub async fn next_event(&mut self) -> Option<BatchEventEnvelope> {
        self.events.recv().await
    }

    /// Waits for the batch task to end.
    ///
    /// Undelivered events are discarded so the task never waits on a full channel.
    pub async fn join(self) -> Result<(), InvokerError> {
        let Self { events, task, .. } = self;
        drop(events);
        task.await.map_err(std::io::Error::other)?
    }
}
