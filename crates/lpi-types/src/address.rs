use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Separator between address segments; a trailing separator marks a ledger prefix.
pub const SEPARATOR: char = '.';

/// A dotted, hierarchical ledger address such as `test1.foo.connector`.
///
/// An address ending with [`SEPARATOR`] is a *ledger prefix* and names a
/// ledger as a whole (`test1.foo.`); anything else names an account on a
/// ledger. Only the structural rules needed by the plugin contract are
/// enforced here: non-empty segments made of `[A-Za-z0-9_~-]`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LedgerAddress(String);

impl LedgerAddress {
    /// Parse and validate an address.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        validate(&value)?;
        Ok(Self(value))
    }

    /// Returns `true` if this address is a ledger prefix (ends with `.`).
    pub fn is_ledger_prefix(&self) -> bool {
        self.0.ends_with(SEPARATOR)
    }

    /// Append a segment to a ledger prefix, e.g. `test1.foo.` + `connector`.
    ///
    /// When `self` is not a prefix, a separator is inserted first.
    pub fn with(&self, segment: &str) -> Result<Self, TypeError> {
        if self.is_ledger_prefix() {
            Self::new(format!("{}{segment}", self.0))
        } else {
            Self::new(format!("{}{SEPARATOR}{segment}", self.0))
        }
    }

    /// Returns `true` if this address lives under `prefix`.
    pub fn starts_with(&self, prefix: &LedgerAddress) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reject `address` unless it is a ledger prefix.
pub fn require_ledger_prefix(address: LedgerAddress) -> Result<LedgerAddress, TypeError> {
    if address.is_ledger_prefix() {
        Ok(address)
    } else {
        Err(TypeError::NotLedgerPrefix(address.0))
    }
}

/// Reject `address` if it is a ledger prefix.
pub fn require_not_ledger_prefix(address: LedgerAddress) -> Result<LedgerAddress, TypeError> {
    if address.is_ledger_prefix() {
        Err(TypeError::UnexpectedLedgerPrefix(address.0))
    } else {
        Ok(address)
    }
}

fn validate(value: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidAddress {
        address: value.to_string(),
        reason: reason.to_string(),
    };

    let body = value.strip_suffix(SEPARATOR).unwrap_or(value);
    if body.is_empty() {
        return Err(invalid("address is empty"));
    }

    for segment in body.split(SEPARATOR) {
        if segment.is_empty() {
            return Err(invalid("empty segment"));
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '~' | '-')))
        {
            return Err(invalid(&format!("illegal character {c:?}")));
        }
    }
    Ok(())
}

impl TryFrom<String> for LedgerAddress {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LedgerAddress> for String {
    fn from(address: LedgerAddress) -> Self {
        address.0
    }
}

impl FromStr for LedgerAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerAddress({})", self.0)
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
