//! Simulated ledger for the Ledger Plugin Interface.
//!
//! The [`SimulatedLedger`] owns a transfer table and a connection registry.
//! Plugins connect with a shared secret and an event emitter; every transfer
//! or message operation notifies the connections of the accounts involved.
//!
//! Transfers move through a small state machine:
//!
//! ```text
//! PREPARED ──fulfill──▶ EXECUTED
//!     │
//!     └──reject/expire──▶ REJECTED
//! ```
//!
//! Balances are derived, never stored: executed credits minus prepared and
//! executed debits.

pub mod connection;
pub mod engine;
pub mod error;
pub mod holder;
pub mod verifier;

pub use connection::{ConnectionRegistry, LedgerConnection, DEFAULT_SHARED_SECRET};
pub use engine::SimulatedLedger;
pub use error::{LedgerError, Result};
pub use holder::{TransferHolder, TransferStatus};
pub use verifier::{FulfillmentVerifier, PreimageSha256Verifier};
