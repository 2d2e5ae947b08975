use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use lpi_plugin::config::{
    CONNECTOR_ACCOUNT, EXPECTED_CURRENCY_UNIT, LEDGER_PREFIX, PASSWORD,
};
use lpi_plugin::SimulatedPluginConfig;
use lpi_types::{CurrencyUnit, LedgerAddress, LedgerInfo};

/// On-disk configuration: plugin options plus the simulated ledger they
/// attach to.
///
/// ```toml
/// [plugin]
/// ledger_prefix = "test1.foo."
/// connector_account = "test1.foo.connector"
/// expected_currency_unit = "USD"
/// timeout = 5000
///
/// [ledger]
/// currency_scale = 2
/// max_balance = 1000000
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub plugin: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub ledger: LedgerSection,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    /// Defaults to the plugin's expected currency unit.
    pub currency_unit: Option<String>,
    pub currency_scale: i32,
    pub connector_addresses: Vec<String>,
    pub min_balance: i64,
    pub max_balance: Option<i64>,
    pub shared_secret: Option<String>,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            currency_unit: None,
            currency_scale: 2,
            connector_addresses: Vec::new(),
            min_balance: 0,
            max_balance: None,
            shared_secret: None,
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Configuration used by `lpi demo` when no file is given.
    pub fn demo() -> Self {
        let plugin = [
            (LEDGER_PREFIX, "test1.foo."),
            (CONNECTOR_ACCOUNT, "test1.foo.connector"),
            (EXPECTED_CURRENCY_UNIT, "USD"),
            (PASSWORD, "password"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), toml::Value::String(v.to_string())))
        .collect();
        Self {
            plugin,
            ledger: LedgerSection::default(),
        }
    }

    /// Plugin options as the flat strings a plugin expects.
    pub fn plugin_options(&self) -> BTreeMap<String, String> {
        self.plugin
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }

    pub fn plugin_config(&self) -> anyhow::Result<SimulatedPluginConfig> {
        Ok(SimulatedPluginConfig::from_options(self.plugin_options())?)
    }

    /// Ledger info for the ledger at `ledger_prefix`.
    pub fn ledger_info(
        &self,
        ledger_prefix: &LedgerAddress,
        fallback_unit: &CurrencyUnit,
    ) -> anyhow::Result<LedgerInfo> {
        let unit = match &self.ledger.currency_unit {
            Some(code) => CurrencyUnit::new(code.as_str())?,
            None => fallback_unit.clone(),
        };
        let mut info = LedgerInfo::new(ledger_prefix.clone(), unit, self.ledger.currency_scale)?
            .with_min_balance(i128::from(self.ledger.min_balance));
        if let Some(max) = self.ledger.max_balance {
            info = info.with_max_balance(i128::from(max));
        }
        for address in &self.ledger.connector_addresses {
            info = info.with_connector(
                LedgerAddress::new(address.as_str())
                    .with_context(|| format!("connector address {address}"))?,
            );
        }
        Ok(info)
    }
}
