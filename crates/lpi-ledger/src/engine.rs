use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, trace};

use lpi_events::LedgerEvent;
use lpi_types::{
    ErrorCode, Fulfillment, LedgerAddress, LedgerInfo, Message, RejectionReason, Transfer,
    TransferId,
};

use crate::connection::{ConnectionRegistry, LedgerConnection, DEFAULT_SHARED_SECRET};
use crate::error::{LedgerError, Result};
use crate::holder::{TransferHolder, TransferStatus};
use crate::verifier::{FulfillmentVerifier, PreimageSha256Verifier};

/// Result of one guarded transition attempt on the transfer table.
enum Transition {
    /// No transfer with that id.
    Missing,
    /// The guard decided nothing needs to change.
    Unchanged,
    /// The holder was replaced; carries the new holder.
    Replaced(TransferHolder),
}

/// An in-memory ledger that plugins connect to.
///
/// Holds the transfer table and the connection registry. All operations are
/// callable concurrently through `&self`. Callers identify themselves with an
/// explicit principal on operations that require authentication.
pub struct SimulatedLedger {
    ledger_info: LedgerInfo,
    transfers: DashMap<TransferId, TransferHolder>,
    connections: ConnectionRegistry,
    verifier: Arc<dyn FulfillmentVerifier>,
}

impl SimulatedLedger {
    /// A ledger using the default shared secret and PREIMAGE-SHA-256
    /// conditions.
    pub fn new(ledger_info: LedgerInfo) -> Self {
        let connections =
            ConnectionRegistry::new(ledger_info.ledger_prefix().clone(), DEFAULT_SHARED_SECRET);
        Self {
            ledger_info,
            transfers: DashMap::new(),
            connections,
            verifier: Arc::new(PreimageSha256Verifier),
        }
    }

    pub fn with_shared_secret(mut self, shared_secret: impl Into<String>) -> Self {
        self.connections =
            ConnectionRegistry::new(self.ledger_info.ledger_prefix().clone(), shared_secret);
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn FulfillmentVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn ledger_info(&self) -> &LedgerInfo {
        &self.ledger_info
    }

    pub fn ledger_prefix(&self) -> &LedgerAddress {
        self.ledger_info.ledger_prefix()
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    pub fn connect(&self, connection: LedgerConnection) -> Result<()> {
        self.connections.connect(connection)
    }

    pub fn disconnect(&self, address: &LedgerAddress) -> bool {
        self.connections.disconnect(address)
    }

    /// Snapshot of the holder for `transfer_id`.
    pub fn transfer(&self, transfer_id: &TransferId) -> Option<TransferHolder> {
        self.transfers.get(transfer_id).map(|h| h.clone())
    }

    pub fn transfer_status(&self, transfer_id: &TransferId) -> Option<TransferStatus> {
        self.transfers.get(transfer_id).map(|h| h.status())
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// Seed the table with a holder in any state, without emitting events.
    ///
    /// Returns `false` if a transfer with the same id already exists.
    pub fn insert_holder(&self, holder: TransferHolder) -> bool {
        match self.transfers.entry(holder.transfer().transfer_id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(holder);
                true
            }
        }
    }

    /// The execution fulfillment of an executed transfer.
    pub fn get_fulfillment(&self, transfer_id: &TransferId) -> Option<Fulfillment> {
        self.transfers.get(transfer_id).and_then(|h| {
            (h.status() == TransferStatus::Executed)
                .then(|| h.execution_fulfillment().cloned())
                .flatten()
        })
    }

    /// Prepare a transfer on behalf of `principal`, who must be its source.
    ///
    /// Submitting an id that already exists changes nothing and emits
    /// nothing.
    pub fn send_transfer(&self, principal: &LedgerAddress, transfer: Transfer) -> Result<()> {
        let transfer_id = transfer.transfer_id();
        if transfer.is_self_transfer() {
            return Err(LedgerError::InvalidTransfer {
                ledger_prefix: self.ledger_prefix().clone(),
                transfer_id,
                reason: self
                    .bad_request(self.ledger_prefix().clone())
                    .with_message("source and destination accounts are the same"),
            });
        }
        if transfer.ledger_prefix() != self.ledger_prefix() {
            return Err(LedgerError::InvalidTransfer {
                ledger_prefix: self.ledger_prefix().clone(),
                transfer_id,
                reason: self.bad_request(self.ledger_prefix().clone()).with_message(format!(
                    "transfer is addressed to ledger {}",
                    transfer.ledger_prefix()
                )),
            });
        }
        self.authorize_transfer(principal, transfer_id, transfer.source_account())?;

        let inserted = match self.transfers.entry(transfer_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(TransferHolder::new(transfer.clone()));
                true
            }
        };
        if !inserted {
            debug!(transfer_id = %transfer_id, "transfer already prepared, ignoring");
            return Ok(());
        }

        debug!(
            transfer_id = %transfer_id,
            source = %transfer.source_account(),
            destination = %transfer.destination_account(),
            amount = %transfer.amount(),
            "transfer prepared"
        );
        self.notify(
            &transfer,
            LedgerEvent::OutgoingTransferPrepared {
                ledger_prefix: self.ledger_prefix().clone(),
                transfer: transfer.clone(),
            },
            LedgerEvent::IncomingTransferPrepared {
                ledger_prefix: self.ledger_prefix().clone(),
                transfer: transfer.clone(),
            },
        );
        Ok(())
    }

    /// Execute a prepared transfer with a proof for its condition.
    ///
    /// A proof that verifies against an already executed transfer is
    /// accepted without effect.
    pub fn fulfill_condition(
        &self,
        transfer_id: &TransferId,
        fulfillment: &Fulfillment,
    ) -> Result<()> {
        let outcome = self.transition(transfer_id, |current| {
            let verified = self
                .verifier
                .verify(fulfillment, current.transfer().execution_condition());
            match (current.status(), verified) {
                (TransferStatus::Rejected, _) => Err(LedgerError::TransferAlreadyRolledBack {
                    ledger_prefix: self.ledger_prefix().clone(),
                    transfer_id: *transfer_id,
                }),
                (_, false) => Err(LedgerError::InvalidFulfillment {
                    ledger_prefix: self.ledger_prefix().clone(),
                    transfer_id: *transfer_id,
                }),
                (TransferStatus::Executed, true) => Ok(None),
                (TransferStatus::Prepared, true) => Ok(Some(current.executed(fulfillment.clone()))),
            }
        })?;

        match outcome {
            Transition::Missing => Err(self.not_found(transfer_id)),
            Transition::Unchanged => {
                debug!(transfer_id = %transfer_id, "transfer already executed, ignoring");
                Ok(())
            }
            Transition::Replaced(holder) => {
                debug!(transfer_id = %transfer_id, "transfer executed");
                let transfer = holder.transfer();
                self.notify(
                    transfer,
                    LedgerEvent::OutgoingTransferFulfilled {
                        ledger_prefix: self.ledger_prefix().clone(),
                        transfer: transfer.clone(),
                        fulfillment: fulfillment.clone(),
                    },
                    LedgerEvent::IncomingTransferFulfilled {
                        ledger_prefix: self.ledger_prefix().clone(),
                        transfer: transfer.clone(),
                        fulfillment: fulfillment.clone(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Reject a prepared transfer on behalf of `principal`, who must be its
    /// destination.
    ///
    /// Rejecting an already rejected transfer changes nothing.
    pub fn reject_incoming_transfer(
        &self,
        principal: &LedgerAddress,
        transfer_id: &TransferId,
        reason: RejectionReason,
    ) -> Result<()> {
        let outcome = self.transition(transfer_id, |current| {
            self.authorize_transfer(
                principal,
                *transfer_id,
                current.transfer().destination_account(),
            )?;
            match current.status() {
                TransferStatus::Executed => Err(LedgerError::TransferAlreadyFulfilled {
                    ledger_prefix: self.ledger_prefix().clone(),
                    transfer_id: *transfer_id,
                }),
                TransferStatus::Rejected => Ok(None),
                TransferStatus::Prepared => Ok(Some(current.rejected())),
            }
        })?;

        match outcome {
            Transition::Missing => Err(self.not_found(transfer_id)),
            Transition::Unchanged => {
                debug!(transfer_id = %transfer_id, "transfer already rejected, ignoring");
                Ok(())
            }
            Transition::Replaced(holder) => {
                debug!(transfer_id = %transfer_id, reason = %reason, "transfer rejected");
                let transfer = holder.transfer();
                self.notify(
                    transfer,
                    LedgerEvent::OutgoingTransferRejected {
                        ledger_prefix: self.ledger_prefix().clone(),
                        transfer: transfer.clone(),
                        reason: reason.clone(),
                    },
                    LedgerEvent::IncomingTransferRejected {
                        ledger_prefix: self.ledger_prefix().clone(),
                        transfer: transfer.clone(),
                        reason,
                    },
                );
                Ok(())
            }
        }
    }

    /// Force a transfer into REJECTED and report it cancelled to both sides.
    ///
    /// This is the ledger's own expiry path: no principal is checked and the
    /// current status is not consulted, so an executed transfer is rolled
    /// back and an already rejected one is reported cancelled again.
    /// Unknown ids are ignored.
    pub fn expire_transfer(&self, transfer_id: &TransferId) {
        let outcome = self.transition(transfer_id, |current| Ok(Some(current.rejected())));
        if let Ok(Transition::Replaced(holder)) = outcome {
            info!(transfer_id = %transfer_id, "transfer expired");
            self.notify_cancelled(holder.transfer());
        }
    }

    /// Expire every prepared transfer whose deadline is at or before `now`.
    ///
    /// Returns the ids that were expired by this call.
    pub fn expire_overdue(&self, now: DateTime<Utc>) -> Vec<TransferId> {
        let overdue: Vec<TransferId> = self
            .transfers
            .iter()
            .filter(|entry| {
                entry.status() == TransferStatus::Prepared && entry.transfer().is_expired_at(now)
            })
            .map(|entry| *entry.key())
            .collect();

        let mut expired = Vec::with_capacity(overdue.len());
        for transfer_id in overdue {
            // Another caller may have settled it since the scan.
            let outcome = self.transition(&transfer_id, |current| {
                Ok((current.status() == TransferStatus::Prepared).then(|| current.rejected()))
            });
            if let Ok(Transition::Replaced(holder)) = outcome {
                info!(transfer_id = %transfer_id, "transfer expired");
                self.notify_cancelled(holder.transfer());
                expired.push(transfer_id);
            }
        }
        expired
    }

    /// Executed credits minus prepared and executed debits.
    ///
    /// Fails with [`LedgerError::BalanceOverflow`] when the running total
    /// leaves the `i128` range.
    pub fn account_balance(&self, account: &LedgerAddress) -> Result<i128> {
        let overflow = || LedgerError::BalanceOverflow {
            ledger_prefix: self.ledger_prefix().clone(),
            account: account.clone(),
        };
        self.transfers.iter().try_fold(0i128, |mut balance, entry| {
            let transfer = entry.transfer();
            if transfer.source_account() == account
                && matches!(
                    entry.status(),
                    TransferStatus::Prepared | TransferStatus::Executed
                )
            {
                balance = balance
                    .checked_sub(transfer.amount())
                    .ok_or_else(overflow)?;
            }
            if transfer.destination_account() == account
                && entry.status() == TransferStatus::Executed
            {
                balance = balance
                    .checked_add(transfer.amount())
                    .ok_or_else(overflow)?;
            }
            Ok(balance)
        })
    }

    /// Route a message from `principal`, who must be its sender.
    pub fn send_message(&self, principal: &LedgerAddress, message: &Message) -> Result<()> {
        if principal != &message.from_address {
            return Err(LedgerError::InvalidMessage {
                ledger_prefix: self.ledger_prefix().clone(),
                message_id: message.id,
                expected: message.from_address.clone(),
                actual: principal.clone(),
            });
        }

        debug!(
            message_id = %message.id,
            from = %message.from_address,
            to = %message.to_address,
            "message routed"
        );
        self.connections.emit_to(
            &message.from_address,
            LedgerEvent::OutgoingMessageRequest {
                ledger_prefix: self.ledger_prefix().clone(),
                message: message.clone(),
            },
        );
        self.connections.emit_to(
            &message.to_address,
            LedgerEvent::IncomingMessageRequest {
                ledger_prefix: self.ledger_prefix().clone(),
                message: message.clone(),
            },
        );
        Ok(())
    }

    /// Read the current holder, let `step` compute its successor, and swap
    /// it in only if the holder is still the one that was read.
    ///
    /// `step` returns `Ok(None)` to leave the holder alone. A lost race
    /// re-reads and re-runs `step`, so guards are always checked against the
    /// state that gets replaced.
    fn transition<F>(&self, transfer_id: &TransferId, mut step: F) -> Result<Transition>
    where
        F: FnMut(&TransferHolder) -> Result<Option<TransferHolder>>,
    {
        loop {
            let current = match self.transfers.get(transfer_id) {
                Some(holder) => holder.clone(),
                None => return Ok(Transition::Missing),
            };
            let next = match step(&current)? {
                Some(next) => next,
                None => return Ok(Transition::Unchanged),
            };
            if self.replace_if_unchanged(transfer_id, &current, next.clone()) {
                return Ok(Transition::Replaced(next));
            }
            trace!(transfer_id = %transfer_id, "concurrent update, retrying transition");
        }
    }

    fn replace_if_unchanged(
        &self,
        transfer_id: &TransferId,
        expected: &TransferHolder,
        next: TransferHolder,
    ) -> bool {
        match self.transfers.get_mut(transfer_id) {
            Some(mut slot) if *slot == *expected => {
                *slot = next;
                true
            }
            _ => false,
        }
    }

    fn authorize_transfer(
        &self,
        principal: &LedgerAddress,
        transfer_id: TransferId,
        required: &LedgerAddress,
    ) -> Result<()> {
        if principal == required {
            return Ok(());
        }
        Err(LedgerError::TransferNotAccepted {
            ledger_prefix: self.ledger_prefix().clone(),
            transfer_id,
            expected: required.clone(),
            actual: principal.clone(),
            reason: self.bad_request(principal.clone()),
        })
    }

    fn bad_request(&self, triggered_by: LedgerAddress) -> RejectionReason {
        RejectionReason::new(ErrorCode::BadRequest, triggered_by)
    }

    fn not_found(&self, transfer_id: &TransferId) -> LedgerError {
        LedgerError::TransferNotFound {
            ledger_prefix: self.ledger_prefix().clone(),
            transfer_id: *transfer_id,
        }
    }

    fn notify_cancelled(&self, transfer: &Transfer) {
        self.notify(
            transfer,
            LedgerEvent::OutgoingTransferCancelled {
                ledger_prefix: self.ledger_prefix().clone(),
                transfer: transfer.clone(),
            },
            LedgerEvent::IncomingTransferCancelled {
                ledger_prefix: self.ledger_prefix().clone(),
                transfer: transfer.clone(),
            },
        );
    }

    /// Outgoing event to the source connection, incoming to the destination.
    fn notify(&self, transfer: &Transfer, outgoing: LedgerEvent, incoming: LedgerEvent) {
        self.connections
            .emit_to(transfer.source_account(), outgoing);
        self.connections
            .emit_to(transfer.destination_account(), incoming);
    }
}
