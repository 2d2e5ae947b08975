use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use lpi_types::HandlerId;

use crate::error::Result;
use crate::event::LedgerEvent;

/// A subscriber to ledger events.
///
/// One entry point covers all event kinds; implementations match on the
/// [`LedgerEvent`] variants they care about and ignore the rest.
pub trait LedgerEventHandler: Send + Sync {
    fn handle(&self, event: &LedgerEvent) -> Result<()>;
}

impl<F> LedgerEventHandler for F
where
    F: Fn(&LedgerEvent) -> Result<()> + Send + Sync,
{
    fn handle(&self, event: &LedgerEvent) -> Result<()> {
        self(event)
    }
}

/// Concurrent set of registered handlers keyed by [`HandlerId`].
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: DashMap<HandlerId, Arc<dyn LedgerEventHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler and return its fresh id.
    pub fn add(&self, handler: Arc<dyn LedgerEventHandler>) -> HandlerId {
        let id = HandlerId::new();
        self.handlers.insert(id, handler);
        debug!(handler_id = %id, total = self.handlers.len(), "event handler added");
        id
    }

    /// Remove a handler. Unknown ids are ignored.
    pub fn remove(&self, id: &HandlerId) {
        if self.handlers.remove(id).is_some() {
            debug!(handler_id = %id, "event handler removed");
        }
    }

    pub fn contains(&self, id: &HandlerId) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Current handlers, in no particular order.
    ///
    /// Callers dispatch over the snapshot so no map shard stays locked while a
    /// handler runs; handlers may add or remove handlers re-entrantly.
    pub fn snapshot(&self) -> Vec<(HandlerId, Arc<dyn LedgerEventHandler>)> {
        self.handlers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }
}
