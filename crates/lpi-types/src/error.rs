use thiserror::Error;

/// Errors produced while constructing or parsing LPI value types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid ledger address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("address must be a ledger prefix ending with '.': {0}")]
    NotLedgerPrefix(String),

    #[error("address must not be a ledger prefix ending with '.': {0}")]
    UnexpectedLedgerPrefix(String),

    #[error("invalid currency unit: {0}")]
    InvalidCurrencyUnit(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
