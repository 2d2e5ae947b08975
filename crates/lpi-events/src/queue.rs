use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::emitter::{dispatch, EventEmitter};
use crate::error::{EventError, Result};
use crate::event::LedgerEvent;
use crate::handler::HandlerRegistry;

enum Queued {
    Event(LedgerEvent),
    Flush(oneshot::Sender<()>),
}

/// Emitter that defers delivery to a background task.
///
/// `emit` only enqueues, so a ledger operation never runs handler code on
/// its own stack. A single drain task delivers events in the order they were
/// emitted. Use [`flush`](QueuedEventEmitter::flush) to wait until every
/// event emitted so far has been handled.
#[derive(Clone)]
pub struct QueuedEventEmitter {
    tx: mpsc::UnboundedSender<Queued>,
}

impl QueuedEventEmitter {
    /// Start the drain task on the current tokio runtime.
    ///
    /// The task exits once every clone of the emitter has been dropped and
    /// the queue is empty.
    pub fn spawn(handlers: Arc<HandlerRegistry>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Queued>();
        let worker = tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                match item {
                    Queued::Event(event) => {
                        dispatch(&handlers, &event);
                    }
                    Queued::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("event queue drained and closed");
        });
        (Self { tx }, worker)
    }

    /// Wait until all events queued before this call have been delivered.
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Queued::Flush(done_tx))
            .map_err(|_| EventError::QueueClosed)?;
        done_rx.await.map_err(|_| EventError::QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl EventEmitter for QueuedEventEmitter {
    fn emit(&self, event: LedgerEvent) {
        let kind = event.kind();
        if self.tx.send(Queued::Event(event)).is_err() {
            warn!(kind = %kind, "event dropped, queue closed");
        }
    }
}
