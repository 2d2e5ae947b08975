use thiserror::Error;

use lpi_events::EventError;
use lpi_ledger::LedgerError;
use lpi_types::LedgerAddress;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{ledger_prefix}: plugin is not connected")]
    NotConnected { ledger_prefix: LedgerAddress },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("event delivery error: {0}")]
    Events(#[from] EventError),
}

pub type PluginResult<T> = Result<T, PluginError>;
