use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::LedgerAddress;
use crate::condition::Condition;
use crate::error::TypeError;
use crate::ids::TransferId;
use crate::payload::{PaymentPacket, SubprotocolData};

/// A conditional transfer on the ledger underlying a plugin.
///
/// The ledger holds the amount until the execution condition is fulfilled,
/// the transfer is rejected, or `expires_at` passes. Transfers are immutable
/// once built; ledgers track their lifecycle separately.
///
/// The amount is signed and carries no sign restriction of its own. Source
/// and destination are not checked against each other here; ledgers reject
/// self-transfers on submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    transfer_id: TransferId,
    ledger_prefix: LedgerAddress,
    source_account: LedgerAddress,
    destination_account: LedgerAddress,
    amount: i128,
    execution_condition: Condition,
    cancellation_condition: Option<Condition>,
    expires_at: DateTime<Utc>,
    payment_packet: PaymentPacket,
    subprotocol_data: Vec<SubprotocolData>,
}

impl Transfer {
    pub fn builder() -> TransferBuilder {
        TransferBuilder::default()
    }

    pub fn transfer_id(&self) -> TransferId {
        self.transfer_id
    }

    pub fn ledger_prefix(&self) -> &LedgerAddress {
        &self.ledger_prefix
    }

    pub fn source_account(&self) -> &LedgerAddress {
        &self.source_account
    }

    pub fn destination_account(&self) -> &LedgerAddress {
        &self.destination_account
    }

    pub fn amount(&self) -> i128 {
        self.amount
    }

    pub fn execution_condition(&self) -> &Condition {
        &self.execution_condition
    }

    pub fn cancellation_condition(&self) -> Option<&Condition> {
        self.cancellation_condition.as_ref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn payment_packet(&self) -> &PaymentPacket {
        &self.payment_packet
    }

    pub fn subprotocol_data(&self) -> &[SubprotocolData] {
        &self.subprotocol_data
    }

    /// Returns `true` if source and destination are the same account.
    pub fn is_self_transfer(&self) -> bool {
        self.source_account == self.destination_account
    }

    /// Returns `true` if the transfer has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Builder for [`Transfer`]. A fresh [`TransferId`] is generated unless one
/// is supplied.
#[derive(Clone, Debug, Default)]
pub struct TransferBuilder {
    transfer_id: Option<TransferId>,
    ledger_prefix: Option<LedgerAddress>,
    source_account: Option<LedgerAddress>,
    destination_account: Option<LedgerAddress>,
    amount: Option<i128>,
    execution_condition: Option<Condition>,
    cancellation_condition: Option<Condition>,
    expires_at: Option<DateTime<Utc>>,
    payment_packet: PaymentPacket,
    subprotocol_data: Vec<SubprotocolData>,
}

impl TransferBuilder {
    pub fn transfer_id(mut self, id: TransferId) -> Self {
        self.transfer_id = Some(id);
        self
    }

    pub fn ledger_prefix(mut self, prefix: LedgerAddress) -> Self {
        self.ledger_prefix = Some(prefix);
        self
    }

    pub fn source_account(mut self, account: LedgerAddress) -> Self {
        self.source_account = Some(account);
        self
    }

    pub fn destination_account(mut self, account: LedgerAddress) -> Self {
        self.destination_account = Some(account);
        self
    }

    pub fn amount(mut self, amount: i128) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn execution_condition(mut self, condition: Condition) -> Self {
        self.execution_condition = Some(condition);
        self
    }

    pub fn cancellation_condition(mut self, condition: Condition) -> Self {
        self.cancellation_condition = Some(condition);
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn payment_packet(mut self, packet: PaymentPacket) -> Self {
        self.payment_packet = packet;
        self
    }

    pub fn subprotocol_data(mut self, data: SubprotocolData) -> Self {
        self.subprotocol_data.push(data);
        self
    }

    pub fn build(self) -> Result<Transfer, TypeError> {
        let ledger_prefix = self
            .ledger_prefix
            .ok_or(TypeError::MissingField("ledger_prefix"))?;
        if !ledger_prefix.is_ledger_prefix() {
            return Err(TypeError::NotLedgerPrefix(ledger_prefix.to_string()));
        }

        Ok(Transfer {
            transfer_id: self.transfer_id.unwrap_or_default(),
            ledger_prefix,
            source_account: self
                .source_account
                .ok_or(TypeError::MissingField("source_account"))?,
            destination_account: self
                .destination_account
                .ok_or(TypeError::MissingField("destination_account"))?,
            amount: self.amount.ok_or(TypeError::MissingField("amount"))?,
            execution_condition: self
                .execution_condition
                .ok_or(TypeError::MissingField("execution_condition"))?,
            cancellation_condition: self.cancellation_condition,
            expires_at: self
                .expires_at
                .ok_or(TypeError::MissingField("expires_at"))?,
            payment_packet: self.payment_packet,
            subprotocol_data: self.subprotocol_data,
        })
    }
}
