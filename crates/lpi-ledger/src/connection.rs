use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use lpi_events::{EventEmitter, LedgerEvent};
use lpi_types::LedgerAddress;

use crate::error::{LedgerError, Result};

/// Credential the simulated ledger accepts when none is configured.
pub const DEFAULT_SHARED_SECRET: &str = "password";

/// A plugin's session with a ledger: who it is, how it authenticated, and
/// where its events go.
#[derive(Clone)]
pub struct LedgerConnection {
    connector_address: LedgerAddress,
    credential: String,
    emitter: Arc<dyn EventEmitter>,
}

impl LedgerConnection {
    pub fn new(
        connector_address: LedgerAddress,
        credential: impl Into<String>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            connector_address,
            credential: credential.into(),
            emitter,
        }
    }

    pub fn connector_address(&self) -> &LedgerAddress {
        &self.connector_address
    }

    pub fn emitter(&self) -> &Arc<dyn EventEmitter> {
        &self.emitter
    }
}

impl fmt::Debug for LedgerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerConnection")
            .field("connector_address", &self.connector_address)
            .finish_non_exhaustive()
    }
}

/// Connections of a ledger, at most one per connector address.
pub struct ConnectionRegistry {
    ledger_prefix: LedgerAddress,
    shared_secret: String,
    connections: DashMap<LedgerAddress, LedgerConnection>,
}

impl ConnectionRegistry {
    pub fn new(ledger_prefix: LedgerAddress, shared_secret: impl Into<String>) -> Self {
        Self {
            ledger_prefix,
            shared_secret: shared_secret.into(),
            connections: DashMap::new(),
        }
    }

    /// Register a connection, replacing any earlier one for the same address.
    ///
    /// The credential must match the shared secret, ignoring ASCII case.
    pub fn connect(&self, connection: LedgerConnection) -> Result<()> {
        if !connection
            .credential
            .eq_ignore_ascii_case(&self.shared_secret)
        {
            warn!(
                ledger_prefix = %self.ledger_prefix,
                connector = %connection.connector_address,
                "connection refused"
            );
            return Err(LedgerError::ConnectionRefused {
                ledger_prefix: self.ledger_prefix.clone(),
                connector: connection.connector_address,
            });
        }

        let connector = connection.connector_address.clone();
        let replaced = self
            .connections
            .insert(connector.clone(), connection)
            .is_some();
        info!(
            ledger_prefix = %self.ledger_prefix,
            connector = %connector,
            replaced,
            total = self.connections.len(),
            "connection registered"
        );
        Ok(())
    }

    /// Drop the connection for `address`. Returns whether one existed.
    pub fn disconnect(&self, address: &LedgerAddress) -> bool {
        let removed = self.connections.remove(address).is_some();
        if removed {
            info!(ledger_prefix = %self.ledger_prefix, connector = %address, "connection removed");
        }
        removed
    }

    pub fn is_connected(&self, address: &LedgerAddress) -> bool {
        self.connections.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn connected_addresses(&self) -> Vec<LedgerAddress> {
        self.connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Deliver `event` to the connection registered for `address`, if any.
    ///
    /// Returns `false` when nobody is connected at that address.
    pub fn emit_to(&self, address: &LedgerAddress, event: LedgerEvent) -> bool {
        // Release the shard before running handlers; they may reconnect.
        let emitter = match self.connections.get(address) {
            Some(connection) => Arc::clone(&connection.emitter),
            None => {
                debug!(connector = %address, kind = %event.kind(), "no connection, event skipped");
                return false;
            }
        };
        emitter.emit(event);
        true
    }
}
