/// Errors produced by event handlers and emitters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// A handler refused or failed to process an event.
    #[error("handler failed: {0}")]
    HandlerFailed(String),

    /// The queued emitter's drain worker has stopped.
    #[error("event queue closed")]
    QueueClosed,
}

/// Convenience alias used throughout the events crate.
pub type Result<T> = std::result::Result<T, EventError>;
