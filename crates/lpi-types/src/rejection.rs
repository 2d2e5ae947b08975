use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::LedgerAddress;

/// Interledger error codes used when a ledger refuses or unwinds a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// F00: the request was malformed or not permitted.
    BadRequest,
    /// F05: the fulfillment did not match the condition.
    WrongCondition,
    /// F99: generic final error raised by an application.
    ApplicationError,
    /// T04: the account does not have enough liquidity.
    InsufficientLiquidity,
    /// R00: the transfer timed out before it was fulfilled.
    TransferTimedOut,
}

impl ErrorCode {
    /// Three-character ILP code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "F00",
            Self::WrongCondition => "F05",
            Self::ApplicationError => "F99",
            Self::InsufficientLiquidity => "T04",
            Self::TransferTimedOut => "R00",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::WrongCondition => "Wrong Condition",
            Self::ApplicationError => "Application Error",
            Self::InsufficientLiquidity => "Insufficient Liquidity",
            Self::TransferTimedOut => "Transfer Timed Out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.name())
    }
}

/// Why a transfer was rejected, and by whom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    pub code: ErrorCode,
    /// Address of the party that raised the rejection.
    pub triggered_by: LedgerAddress,
    pub triggered_at: DateTime<Utc>,
    pub message: String,
}

impl RejectionReason {
    pub fn new(code: ErrorCode, triggered_by: LedgerAddress) -> Self {
        Self {
            code,
            triggered_by,
            triggered_at: Utc::now(),
            message: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (triggered by {})", self.code, self.triggered_by)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}
