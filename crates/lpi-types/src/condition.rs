use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TypeError;

/// Length in bytes of a condition fingerprint.
pub const CONDITION_LEN: usize = 32;

/// A PREIMAGE-SHA-256 execution or cancellation condition.
///
/// The condition is the SHA-256 digest of a secret preimage; whoever can
/// present the preimage (the [`Fulfillment`]) may execute the transfer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition([u8; CONDITION_LEN]);

impl Condition {
    pub fn from_bytes(bytes: [u8; CONDITION_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CONDITION_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; CONDITION_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| TypeError::InvalidLength {
                    expected: CONDITION_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({})", hex::encode(&self.0[..4]))
    }
}

/// The preimage proof that satisfies a [`Condition`].
///
/// The preimage is deliberately hidden from `Debug` output; it is the
/// secret that releases funds.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fulfillment {
    preimage: Vec<u8>,
}

impl Fulfillment {
    pub fn from_preimage(preimage: impl Into<Vec<u8>>) -> Self {
        Self {
            preimage: preimage.into(),
        }
    }

    /// A fresh 32-byte random preimage, for tests and demos.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::from_preimage(bytes.to_vec())
    }

    pub fn preimage(&self) -> &[u8] {
        &self.preimage
    }

    /// The condition this fulfillment satisfies.
    pub fn condition(&self) -> Condition {
        Condition(Sha256::digest(&self.preimage).into())
    }

    /// Returns `true` if this fulfillment satisfies `condition`.
    pub fn verify(&self, condition: &Condition) -> bool {
        self.condition() == *condition
    }
}

impl fmt::Debug for Fulfillment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fulfillment(len={})", self.preimage.len())
    }
}
