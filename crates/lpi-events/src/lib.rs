//! Event model and delivery for ledger plugins.
//!
//! Plugins and ledgers report everything that happens to a connection as a
//! [`LedgerEvent`]. Subscribers implement [`LedgerEventHandler`] and register
//! with a [`HandlerRegistry`]; an [`EventEmitter`] fans each event out to the
//! registered handlers.
//!
//! # Emitters
//!
//! - [`SyncEventEmitter`]: Handlers run inside `emit`
//! - [`QueuedEventEmitter`]: Handlers run on a background tokio task, in order

pub mod emitter;
pub mod error;
pub mod event;
pub mod handler;
pub mod queue;

pub use emitter::{dispatch, EventEmitter, SyncEventEmitter};
pub use error::{EventError, Result};
pub use event::{Direction, EventKind, LedgerEvent};
pub use handler::{HandlerRegistry, LedgerEventHandler};
pub use queue::QueuedEventEmitter;
