//! Ledger plugins for the Ledger Plugin Interface.
//!
//! A connector drives one [`LedgerPlugin`] per ledger it is attached to. The
//! plugin tracks connection state, dispatches ledger events to registered
//! handlers, and forwards transfer and message operations to a
//! [`LedgerAdapter`] acting as the connector account.
//!
//! [`MockLedgerPlugin`] pairs the facade with a shared
//! [`SimulatedLedger`](lpi_ledger::SimulatedLedger), for tests and demos.

pub mod adapter;
pub mod config;
pub mod error;
pub mod plugin;

pub use adapter::{LedgerAdapter, SimulatedLedgerAdapter};
pub use config::{ConfigError, PluginConfig, SimulatedPluginConfig};
pub use error::{PluginError, PluginResult};
pub use plugin::{LedgerPlugin, MockLedgerPlugin};

// Re-export key types
pub use lpi_events::{EventKind, HandlerRegistry, LedgerEvent, LedgerEventHandler};
pub use lpi_ledger::{LedgerError, SimulatedLedger, TransferHolder, TransferStatus};
pub use lpi_types::{
    Fulfillment, LedgerAddress, LedgerInfo, Message, RejectionReason, Transfer, TransferId,
};
