use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::{require_ledger_prefix, LedgerAddress};
use crate::error::TypeError;

/// Three-letter code of the asset a ledger holds, e.g. `USD`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyUnit(String);

impl CurrencyUnit {
    pub fn new(code: impl Into<String>) -> Result<Self, TypeError> {
        let code = code.into();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(TypeError::InvalidCurrencyUnit(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyUnit {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyUnit> for String {
    fn from(unit: CurrencyUnit) -> Self {
        unit.0
    }
}

impl FromStr for CurrencyUnit {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for CurrencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyUnit({})", self.0)
    }
}

impl fmt::Display for CurrencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata describing a ledger, as reported by the ledger or configured.
///
/// One ledger base unit equals `10^-currency_scale` of `currency_unit`; with
/// a scale of 2, an amount of `10000` reads as `100.00`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLedgerInfo", into = "RawLedgerInfo")]
pub struct LedgerInfo {
    ledger_prefix: LedgerAddress,
    currency_unit: CurrencyUnit,
    currency_scale: i32,
    connector_addresses: Vec<LedgerAddress>,
    min_balance: i128,
    max_balance: Option<i128>,
}

impl LedgerInfo {
    /// Create ledger info with a zero minimum and no maximum balance.
    ///
    /// Fails unless `ledger_prefix` is a ledger prefix.
    pub fn new(
        ledger_prefix: LedgerAddress,
        currency_unit: CurrencyUnit,
        currency_scale: i32,
    ) -> Result<Self, TypeError> {
        Ok(Self {
            ledger_prefix: require_ledger_prefix(ledger_prefix)?,
            currency_unit,
            currency_scale,
            connector_addresses: Vec::new(),
            min_balance: 0,
            max_balance: None,
        })
    }

    pub fn with_connector(mut self, address: LedgerAddress) -> Self {
        self.connector_addresses.push(address);
        self
    }

    pub fn with_min_balance(mut self, min_balance: i128) -> Self {
        self.min_balance = min_balance;
        self
    }

    pub fn with_max_balance(mut self, max_balance: i128) -> Self {
        self.max_balance = Some(max_balance);
        self
    }

    pub fn ledger_prefix(&self) -> &LedgerAddress {
        &self.ledger_prefix
    }

    pub fn currency_unit(&self) -> &CurrencyUnit {
        &self.currency_unit
    }

    pub fn currency_scale(&self) -> i32 {
        self.currency_scale
    }

    /// Addresses of connectors holding accounts on this ledger.
    pub fn connector_addresses(&self) -> &[LedgerAddress] {
        &self.connector_addresses
    }

    pub fn min_balance(&self) -> i128 {
        self.min_balance
    }

    /// `None` means unbounded.
    pub fn max_balance(&self) -> Option<i128> {
        self.max_balance
    }
}

#[derive(Serialize, Deserialize)]
struct RawLedgerInfo {
    ledger_prefix: LedgerAddress,
    currency_unit: CurrencyUnit,
    currency_scale: i32,
    #[serde(default)]
    connector_addresses: Vec<LedgerAddress>,
    #[serde(default)]
    min_balance: i128,
    #[serde(default)]
    max_balance: Option<i128>,
}

impl TryFrom<RawLedgerInfo> for LedgerInfo {
    type Error = TypeError;

    fn try_from(raw: RawLedgerInfo) -> Result<Self, Self::Error> {
        let mut info = LedgerInfo::new(raw.ledger_prefix, raw.currency_unit, raw.currency_scale)?;
        info.connector_addresses = raw.connector_addresses;
        info.min_balance = raw.min_balance;
        info.max_balance = raw.max_balance;
        Ok(info)
    }
}

impl From<LedgerInfo> for RawLedgerInfo {
    fn from(info: LedgerInfo) -> Self {
        Self {
            ledger_prefix: info.ledger_prefix,
            currency_unit: info.currency_unit,
            currency_scale: info.currency_scale,
            connector_addresses: info.connector_addresses,
            min_balance: info.min_balance,
            max_balance: info.max_balance,
        }
    }
}
