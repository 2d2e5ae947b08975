use serde::{Deserialize, Serialize};

use lpi_types::{Fulfillment, Transfer};

/// Lifecycle state of a transfer on the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Funds are on hold pending a fulfillment.
    Prepared,
    Executed,
    Rejected,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Prepared)
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Prepared => "PREPARED",
            Self::Executed => "EXECUTED",
            Self::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// A transfer together with its ledger-side state.
///
/// Holders are never mutated in place. Each transition builds a new holder
/// that replaces the old one in the transfer table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHolder {
    transfer: Transfer,
    status: TransferStatus,
    execution_fulfillment: Option<Fulfillment>,
    /// Set only when the recipient cancels with a proof.
    cancellation_fulfillment: Option<Fulfillment>,
}

impl TransferHolder {
    /// A freshly prepared holder.
    pub fn new(transfer: Transfer) -> Self {
        Self {
            transfer,
            status: TransferStatus::Prepared,
            execution_fulfillment: None,
            cancellation_fulfillment: None,
        }
    }

    /// Same holder with a different status. Used to seed ledgers.
    pub fn with_status(mut self, status: TransferStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_cancellation_fulfillment(mut self, fulfillment: Fulfillment) -> Self {
        self.cancellation_fulfillment = Some(fulfillment);
        self
    }

    /// The executed successor of this holder.
    pub fn executed(&self, fulfillment: Fulfillment) -> Self {
        Self {
            status: TransferStatus::Executed,
            execution_fulfillment: Some(fulfillment),
            ..self.clone()
        }
    }

    /// The rejected successor of this holder.
    pub fn rejected(&self) -> Self {
        Self {
            status: TransferStatus::Rejected,
            ..self.clone()
        }
    }

    pub fn transfer(&self) -> &Transfer {
        &self.transfer
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn execution_fulfillment(&self) -> Option<&Fulfillment> {
        self.execution_fulfillment.as_ref()
    }

    pub fn cancellation_fulfillment(&self) -> Option<&Fulfillment> {
        self.cancellation_fulfillment.as_ref()
    }
}
