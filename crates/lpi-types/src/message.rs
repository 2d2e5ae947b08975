use serde::{Deserialize, Serialize};

use crate::address::LedgerAddress;
use crate::ids::MessageId;
use crate::payload::{PaymentPacket, SubprotocolData};

/// A message routed through a ledger between two accounts.
///
/// Messages are never stored; a ledger only forwards them to the matching
/// connections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from_address: LedgerAddress,
    pub to_address: LedgerAddress,
    /// Prefix of the ledger the message is sent on.
    pub ledger_prefix: LedgerAddress,
    pub payment_packet: PaymentPacket,
    pub subprotocol_data: Vec<SubprotocolData>,
}

impl Message {
    /// A message with a fresh id and no payload.
    pub fn new(
        ledger_prefix: LedgerAddress,
        from_address: LedgerAddress,
        to_address: LedgerAddress,
    ) -> Self {
        Self {
            id: MessageId::new(),
            from_address,
            to_address,
            ledger_prefix,
            payment_packet: PaymentPacket::empty(),
            subprotocol_data: Vec::new(),
        }
    }

    pub fn with_payment_packet(mut self, packet: PaymentPacket) -> Self {
        self.payment_packet = packet;
        self
    }

    pub fn with_subprotocol_data(mut self, data: SubprotocolData) -> Self {
        self.subprotocol_data.push(data);
        self
    }
}
