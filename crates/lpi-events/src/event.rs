use serde::{Deserialize, Serialize};

use lpi_types::{Fulfillment, LedgerAddress, Message, RejectionReason, Transfer};

/// Which side of a transfer or message an event is reported to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The receiving connection is the sender.
    Outgoing,
    /// The receiving connection is the recipient.
    Incoming,
}

/// Classification of ledger events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Connected,
    Disconnected,
    Error,
    OutgoingTransferPrepared,
    OutgoingTransferFulfilled,
    OutgoingTransferRejected,
    OutgoingTransferCancelled,
    OutgoingMessageRequest,
    IncomingTransferPrepared,
    IncomingTransferFulfilled,
    IncomingTransferRejected,
    IncomingTransferCancelled,
    IncomingMessageRequest,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        Self::Connected,
        Self::Disconnected,
        Self::Error,
        Self::OutgoingTransferPrepared,
        Self::OutgoingTransferFulfilled,
        Self::OutgoingTransferRejected,
        Self::OutgoingTransferCancelled,
        Self::OutgoingMessageRequest,
        Self::IncomingTransferPrepared,
        Self::IncomingTransferFulfilled,
        Self::IncomingTransferRejected,
        Self::IncomingTransferCancelled,
        Self::IncomingMessageRequest,
    ];
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::Error => "Error",
            Self::OutgoingTransferPrepared => "OutgoingTransferPrepared",
            Self::OutgoingTransferFulfilled => "OutgoingTransferFulfilled",
            Self::OutgoingTransferRejected => "OutgoingTransferRejected",
            Self::OutgoingTransferCancelled => "OutgoingTransferCancelled",
            Self::OutgoingMessageRequest => "OutgoingMessageRequest",
            Self::IncomingTransferPrepared => "IncomingTransferPrepared",
            Self::IncomingTransferFulfilled => "IncomingTransferFulfilled",
            Self::IncomingTransferRejected => "IncomingTransferRejected",
            Self::IncomingTransferCancelled => "IncomingTransferCancelled",
            Self::IncomingMessageRequest => "IncomingMessageRequest",
        };
        write!(f, "{s}")
    }
}

/// An event raised by a ledger plugin or the ledger underneath it.
///
/// Every event names the ledger prefix it came from. Transfer events carry
/// the transfer as it was when the event fired; fulfilled and rejected
/// events also carry the proof or the reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// The plugin connected to its ledger.
    Connected { ledger_prefix: LedgerAddress },
    /// The plugin disconnected from its ledger.
    Disconnected { ledger_prefix: LedgerAddress },
    /// The plugin failed; subscribers typically deregister it.
    Error {
        ledger_prefix: LedgerAddress,
        error: String,
    },
    OutgoingTransferPrepared {
        ledger_prefix: LedgerAddress,
        transfer: Transfer,
    },
    OutgoingTransferFulfilled {
        ledger_prefix: LedgerAddress,
        transfer: Transfer,
        fulfillment: Fulfillment,
    },
    OutgoingTransferRejected {
        ledger_prefix: LedgerAddress,
        transfer: Transfer,
        reason: RejectionReason,
    },
    /// Raised by the ledger on expiry, not by the receiver.
    OutgoingTransferCancelled {
        ledger_prefix: LedgerAddress,
        transfer: Transfer,
    },
    OutgoingMessageRequest {
        ledger_prefix: LedgerAddress,
        message: Message,
    },
    IncomingTransferPrepared {
        ledger_prefix: LedgerAddress,
        transfer: Transfer,
    },
    IncomingTransferFulfilled {
        ledger_prefix: LedgerAddress,
        transfer: Transfer,
        fulfillment: Fulfillment,
    },
    IncomingTransferRejected {
        ledger_prefix: LedgerAddress,
        transfer: Transfer,
        reason: RejectionReason,
    },
    IncomingTransferCancelled {
        ledger_prefix: LedgerAddress,
        transfer: Transfer,
    },
    IncomingMessageRequest {
        ledger_prefix: LedgerAddress,
        message: Message,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected { .. } => EventKind::Connected,
            Self::Disconnected { .. } => EventKind::Disconnected,
            Self::Error { .. } => EventKind::Error,
            Self::OutgoingTransferPrepared { .. } => EventKind::OutgoingTransferPrepared,
            Self::OutgoingTransferFulfilled { .. } => EventKind::OutgoingTransferFulfilled,
            Self::OutgoingTransferRejected { .. } => EventKind::OutgoingTransferRejected,
            Self::OutgoingTransferCancelled { .. } => EventKind::OutgoingTransferCancelled,
            Self::OutgoingMessageRequest { .. } => EventKind::OutgoingMessageRequest,
            Self::IncomingTransferPrepared { .. } => EventKind::IncomingTransferPrepared,
            Self::IncomingTransferFulfilled { .. } => EventKind::IncomingTransferFulfilled,
            Self::IncomingTransferRejected { .. } => EventKind::IncomingTransferRejected,
            Self::IncomingTransferCancelled { .. } => EventKind::IncomingTransferCancelled,
            Self::IncomingMessageRequest { .. } => EventKind::IncomingMessageRequest,
        }
    }

    pub fn ledger_prefix(&self) -> &LedgerAddress {
        match self {
            Self::Connected { ledger_prefix }
            | Self::Disconnected { ledger_prefix }
            | Self::Error { ledger_prefix, .. }
            | Self::OutgoingTransferPrepared { ledger_prefix, .. }
            | Self::OutgoingTransferFulfilled { ledger_prefix, .. }
            | Self::OutgoingTransferRejected { ledger_prefix, .. }
            | Self::OutgoingTransferCancelled { ledger_prefix, .. }
            | Self::OutgoingMessageRequest { ledger_prefix, .. }
            | Self::IncomingTransferPrepared { ledger_prefix, .. }
            | Self::IncomingTransferFulfilled { ledger_prefix, .. }
            | Self::IncomingTransferRejected { ledger_prefix, .. }
            | Self::IncomingTransferCancelled { ledger_prefix, .. }
            | Self::IncomingMessageRequest { ledger_prefix, .. } => ledger_prefix,
        }
    }

    /// The transfer this event reports on, if any.
    pub fn transfer(&self) -> Option<&Transfer> {
        match self {
            Self::OutgoingTransferPrepared { transfer, .. }
            | Self::OutgoingTransferFulfilled { transfer, .. }
            | Self::OutgoingTransferRejected { transfer, .. }
            | Self::OutgoingTransferCancelled { transfer, .. }
            | Self::IncomingTransferPrepared { transfer, .. }
            | Self::IncomingTransferFulfilled { transfer, .. }
            | Self::IncomingTransferRejected { transfer, .. }
            | Self::IncomingTransferCancelled { transfer, .. } => Some(transfer),
            _ => None,
        }
    }

    /// The message this event reports on, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::OutgoingMessageRequest { message, .. }
            | Self::IncomingMessageRequest { message, .. } => Some(message),
            _ => None,
        }
    }

    /// `None` for lifecycle events (connect, disconnect, error).
    pub fn direction(&self) -> Option<Direction> {
        match self.kind() {
            EventKind::Connected | EventKind::Disconnected | EventKind::Error => None,
            EventKind::OutgoingTransferPrepared
            | EventKind::OutgoingTransferFulfilled
            | EventKind::OutgoingTransferRejected
            | EventKind::OutgoingTransferCancelled
            | EventKind::OutgoingMessageRequest => Some(Direction::Outgoing),
            EventKind::IncomingTransferPrepared
            | EventKind::IncomingTransferFulfilled
            | EventKind::IncomingTransferRejected
            | EventKind::IncomingTransferCancelled
            | EventKind::IncomingMessageRequest => Some(Direction::Incoming),
        }
    }
}
