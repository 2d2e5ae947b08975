use lpi_types::{LedgerAddress, MessageId, RejectionReason, TransferId};

/// Errors produced by ledger operations.
///
/// Every variant names the prefix of the ledger that raised it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{ledger_prefix}: invalid transfer {transfer_id}: {reason}")]
    InvalidTransfer {
        ledger_prefix: LedgerAddress,
        transfer_id: TransferId,
        reason: RejectionReason,
    },

    #[error("{ledger_prefix}: transfer {transfer_id} not found")]
    TransferNotFound {
        ledger_prefix: LedgerAddress,
        transfer_id: TransferId,
    },

    #[error("{ledger_prefix}: transfer {transfer_id} has already been fulfilled")]
    TransferAlreadyFulfilled {
        ledger_prefix: LedgerAddress,
        transfer_id: TransferId,
    },

    #[error("{ledger_prefix}: transfer {transfer_id} has already been rolled back")]
    TransferAlreadyRolledBack {
        ledger_prefix: LedgerAddress,
        transfer_id: TransferId,
    },

    #[error("{ledger_prefix}: fulfillment does not match the condition of transfer {transfer_id}")]
    InvalidFulfillment {
        ledger_prefix: LedgerAddress,
        transfer_id: TransferId,
    },

    #[error(
        "{ledger_prefix}: transfer {transfer_id} not accepted: expected principal '{expected}', but was '{actual}'"
    )]
    TransferNotAccepted {
        ledger_prefix: LedgerAddress,
        transfer_id: TransferId,
        expected: LedgerAddress,
        actual: LedgerAddress,
        reason: RejectionReason,
    },

    #[error(
        "{ledger_prefix}: message {message_id} rejected: expected sender '{expected}', but was '{actual}'"
    )]
    InvalidMessage {
        ledger_prefix: LedgerAddress,
        message_id: MessageId,
        expected: LedgerAddress,
        actual: LedgerAddress,
    },

    #[error("{ledger_prefix}: account {account} not found")]
    AccountNotFound {
        ledger_prefix: LedgerAddress,
        account: LedgerAddress,
    },

    #[error("{ledger_prefix}: balance of {account} is outside the representable range")]
    BalanceOverflow {
        ledger_prefix: LedgerAddress,
        account: LedgerAddress,
    },

    #[error("{ledger_prefix}: connection refused for {connector}: bad credential")]
    ConnectionRefused {
        ledger_prefix: LedgerAddress,
        connector: LedgerAddress,
    },
}

impl LedgerError {
    /// Prefix of the ledger that raised this error.
    pub fn ledger_prefix(&self) -> &LedgerAddress {
        match self {
            Self::InvalidTransfer { ledger_prefix, .. }
            | Self::TransferNotFound { ledger_prefix, .. }
            | Self::TransferAlreadyFulfilled { ledger_prefix, .. }
            | Self::TransferAlreadyRolledBack { ledger_prefix, .. }
            | Self::InvalidFulfillment { ledger_prefix, .. }
            | Self::TransferNotAccepted { ledger_prefix, .. }
            | Self::InvalidMessage { ledger_prefix, .. }
            | Self::AccountNotFound { ledger_prefix, .. }
            | Self::BalanceOverflow { ledger_prefix, .. }
            | Self::ConnectionRefused { ledger_prefix, .. } => ledger_prefix,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
