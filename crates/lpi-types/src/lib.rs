//! Foundation types for the Ledger Plugin Interface (LPI).
//!
//! Every other LPI crate depends on `lpi-types`. Values here are immutable
//! records; lifecycle state lives in the ledger engine.
//!
//! # Key Types
//!
//! - [`LedgerAddress`]: Dotted account address or ledger prefix
//! - [`TransferId`], [`MessageId`], [`HandlerId`]: Distinct UUID identifiers
//! - [`Condition`] / [`Fulfillment`]: PREIMAGE-SHA-256 hashlock pair
//! - [`Transfer`]: Conditional transfer submitted to a ledger
//! - [`Message`]: Ephemeral message routed between accounts
//! - [`LedgerInfo`]: Ledger prefix, currency and balance bounds
//! - [`RejectionReason`]: Why a transfer was rejected

pub mod address;
pub mod condition;
pub mod error;
pub mod ids;
pub mod ledger_info;
pub mod message;
pub mod payload;
pub mod rejection;
pub mod transfer;

pub use address::{require_ledger_prefix, require_not_ledger_prefix, LedgerAddress};
pub use condition::{Condition, Fulfillment};
pub use error::TypeError;
pub use ids::{HandlerId, LedgerPluginTypeId, MessageId, TransferId};
pub use ledger_info::{CurrencyUnit, LedgerInfo};
pub use message::Message;
pub use payload::{PaymentPacket, SubprotocolData};
pub use rejection::{ErrorCode, RejectionReason};
pub use transfer::{Transfer, TransferBuilder};
