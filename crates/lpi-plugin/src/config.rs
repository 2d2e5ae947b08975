use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lpi_types::{
    require_ledger_prefix, require_not_ledger_prefix, CurrencyUnit, LedgerAddress,
    LedgerPluginTypeId,
};

pub const LEDGER_PREFIX: &str = "ledger_prefix";
pub const CONNECTOR_ACCOUNT: &str = "connector_account";
pub const EXPECTED_CURRENCY_UNIT: &str = "expected_currency_unit";
pub const TIMEOUT: &str = "timeout";
pub const PASSWORD: &str = "password";

/// Plugin type of the simulated ledger plugin.
pub const SIMULATED_PLUGIN_TYPE: &str = "ilp-plugin-mock";

/// Password assumed when a simulated plugin is configured without one.
pub const DEFAULT_PASSWORD: &str = "password";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no {0} option supplied in plugin options")]
    MissingOption(&'static str),

    #[error("invalid {key} option '{value}': {reason}")]
    InvalidOption {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Typed configuration shared by every ledger plugin.
///
/// Built from the flat string options a connector hands to a plugin. Keys
/// this type does not recognize stay available through
/// [`option`](PluginConfig::option).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub plugin_type: LedgerPluginTypeId,
    /// Prefix of the ledger this plugin is attached to.
    pub ledger_prefix: LedgerAddress,
    /// The connector's own account on that ledger.
    pub connector_account: LedgerAddress,
    pub expected_currency_unit: CurrencyUnit,
    /// How long callers should wait on the ledger. `None` means no limit.
    pub timeout: Option<Duration>,
    pub options: BTreeMap<String, String>,
}

impl PluginConfig {
    pub fn from_options<K, V>(
        plugin_type: LedgerPluginTypeId,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, ConfigError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let options: BTreeMap<String, String> = options
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let ledger_prefix = parse(&options, LEDGER_PREFIX, |raw| {
            LedgerAddress::new(raw).and_then(require_ledger_prefix)
        })?;
        let connector_account = parse(&options, CONNECTOR_ACCOUNT, |raw| {
            LedgerAddress::new(raw).and_then(require_not_ledger_prefix)
        })?;
        let expected_currency_unit = parse(&options, EXPECTED_CURRENCY_UNIT, |raw| CurrencyUnit::new(raw))?;
        let timeout = match options.get(TIMEOUT) {
            None => None,
            Some(raw) => {
                let millis = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidOption {
                        key: TIMEOUT,
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?;
                Some(Duration::from_millis(millis))
            }
        };

        Ok(Self {
            plugin_type,
            ledger_prefix,
            connector_account,
            expected_currency_unit,
            timeout,
            options,
        })
    }

    /// Raw value of any option, including extension keys.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// Configuration of a plugin backed by a simulated ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedPluginConfig {
    pub base: PluginConfig,
    /// Shared secret presented to the ledger on connect.
    pub password: String,
}

impl SimulatedPluginConfig {
    pub fn from_options<K, V>(options: impl IntoIterator<Item = (K, V)>) -> Result<Self, ConfigError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut options: BTreeMap<String, String> = options
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        options
            .entry(PASSWORD.to_string())
            .or_insert_with(|| DEFAULT_PASSWORD.to_string());
        let password = options
            .get(PASSWORD)
            .cloned()
            .ok_or(ConfigError::MissingOption(PASSWORD))?;

        let base = PluginConfig::from_options(LedgerPluginTypeId::new(SIMULATED_PLUGIN_TYPE), options)?;
        Ok(Self { base, password })
    }
}

fn parse<T, E: std::fmt::Display>(
    options: &BTreeMap<String, String>,
    key: &'static str,
    convert: impl FnOnce(&str) -> Result<T, E>,
) -> Result<T, ConfigError> {
    let raw = options.get(key).ok_or(ConfigError::MissingOption(key))?;
    convert(raw).map_err(|e| ConfigError::InvalidOption {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}
