use std::sync::Arc;

use tracing::{trace, warn};

use crate::event::LedgerEvent;
use crate::handler::HandlerRegistry;

/// Delivers ledger events to a plugin's handlers.
///
/// A plugin has exactly one emitter. Ledgers hold the emitter of each
/// connected plugin and call [`emit`](EventEmitter::emit) for every event
/// addressed to it. Emitting never fails from the caller's point of view;
/// delivery problems are logged by the emitter.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: LedgerEvent);
}

/// Invoke every registered handler with `event`.
///
/// A failing handler does not stop delivery to the others. Returns the
/// number of handlers that reported an error.
pub fn dispatch(handlers: &HandlerRegistry, event: &LedgerEvent) -> usize {
    let mut failures = 0;
    for (handler_id, handler) in handlers.snapshot() {
        if let Err(error) = handler.handle(event) {
            failures += 1;
            warn!(
                handler_id = %handler_id,
                kind = %event.kind(),
                error = %error,
                "event handler failed"
            );
        }
    }
    trace!(kind = %event.kind(), failures, "event dispatched");
    failures
}

/// Emitter that calls handlers directly on the emitting thread.
///
/// Handlers have observed the event by the time `emit` returns.
#[derive(Clone)]
pub struct SyncEventEmitter {
    handlers: Arc<HandlerRegistry>,
}

impl SyncEventEmitter {
    pub fn new(handlers: Arc<HandlerRegistry>) -> Self {
        Self { handlers }
    }
}

impl EventEmitter for SyncEventEmitter {
    fn emit(&self, event: LedgerEvent) {
        dispatch(&self.handlers, &event);
    }
}
