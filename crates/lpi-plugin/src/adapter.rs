use std::sync::Arc;

use tracing::debug;

use lpi_events::EventEmitter;
use lpi_ledger::{LedgerConnection, LedgerError, SimulatedLedger};
use lpi_types::{Fulfillment, LedgerAddress, LedgerInfo, Message, RejectionReason, Transfer, TransferId};

/// Ledger-specific half of a plugin.
///
/// [`LedgerPlugin`](crate::LedgerPlugin) owns lifecycle, handlers and
/// connection state; an adapter only talks to one kind of ledger. Operations
/// that need authorization receive the acting principal explicitly.
pub trait LedgerAdapter: Send + Sync {
    /// Open a session for `connector` whose events go to `emitter`.
    fn connect(
        &self,
        connector: &LedgerAddress,
        emitter: Arc<dyn EventEmitter>,
    ) -> Result<(), LedgerError>;

    fn disconnect(&self, connector: &LedgerAddress) -> Result<(), LedgerError>;

    fn ledger_info(&self) -> LedgerInfo;

    fn balance(&self, account: &LedgerAddress) -> Result<i128, LedgerError>;

    fn get_fulfillment(&self, transfer_id: &TransferId) -> Option<Fulfillment>;

    fn send_transfer(&self, principal: &LedgerAddress, transfer: Transfer)
        -> Result<(), LedgerError>;

    fn send_message(&self, principal: &LedgerAddress, message: &Message) -> Result<(), LedgerError>;

    fn fulfill_condition(
        &self,
        transfer_id: &TransferId,
        fulfillment: &Fulfillment,
    ) -> Result<(), LedgerError>;

    fn reject_incoming_transfer(
        &self,
        principal: &LedgerAddress,
        transfer_id: &TransferId,
        reason: RejectionReason,
    ) -> Result<(), LedgerError>;
}

/// Adapter for a [`SimulatedLedger`] shared with other plugins.
#[derive(Clone)]
pub struct SimulatedLedgerAdapter {
    ledger: Arc<SimulatedLedger>,
    password: String,
}

impl SimulatedLedgerAdapter {
    pub fn new(ledger: Arc<SimulatedLedger>, password: impl Into<String>) -> Self {
        Self {
            ledger,
            password: password.into(),
        }
    }

    pub fn ledger(&self) -> &Arc<SimulatedLedger> {
        &self.ledger
    }
}

impl LedgerAdapter for SimulatedLedgerAdapter {
    fn connect(
        &self,
        connector: &LedgerAddress,
        emitter: Arc<dyn EventEmitter>,
    ) -> Result<(), LedgerError> {
        self.ledger.connect(LedgerConnection::new(
            connector.clone(),
            self.password.clone(),
            emitter,
        ))
    }

    fn disconnect(&self, connector: &LedgerAddress) -> Result<(), LedgerError> {
        if !self.ledger.disconnect(connector) {
            debug!(connector = %connector, "no connection to remove");
        }
        Ok(())
    }

    fn ledger_info(&self) -> LedgerInfo {
        self.ledger.ledger_info().clone()
    }

    fn balance(&self, account: &LedgerAddress) -> Result<i128, LedgerError> {
        self.ledger.account_balance(account)
    }

    fn get_fulfillment(&self, transfer_id: &TransferId) -> Option<Fulfillment> {
        self.ledger.get_fulfillment(transfer_id)
    }

    fn send_transfer(
        &self,
        principal: &LedgerAddress,
        transfer: Transfer,
    ) -> Result<(), LedgerError> {
        self.ledger.send_transfer(principal, transfer)
    }

    fn send_message(&self, principal: &LedgerAddress, message: &Message) -> Result<(), LedgerError> {
        self.ledger.send_message(principal, message)
    }

    fn fulfill_condition(
        &self,
        transfer_id: &TransferId,
        fulfillment: &Fulfillment,
    ) -> Result<(), LedgerError> {
        self.ledger.fulfill_condition(transfer_id, fulfillment)
    }

    fn reject_incoming_transfer(
        &self,
        principal: &LedgerAddress,
        transfer_id: &TransferId,
        reason: RejectionReason,
    ) -> Result<(), LedgerError> {
        self.ledger
            .reject_incoming_transfer(principal, transfer_id, reason)
    }
}
