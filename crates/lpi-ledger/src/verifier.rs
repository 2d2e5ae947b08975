use lpi_types::{Condition, Fulfillment};

/// Decides whether a fulfillment satisfies a transfer's condition.
pub trait FulfillmentVerifier: Send + Sync {
    fn verify(&self, fulfillment: &Fulfillment, condition: &Condition) -> bool;
}

/// PREIMAGE-SHA-256: the SHA-256 digest of the preimage must equal the
/// condition.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreimageSha256Verifier;

impl FulfillmentVerifier for PreimageSha256Verifier {
    fn verify(&self, fulfillment: &Fulfillment, condition: &Condition) -> bool {
        fulfillment.verify(condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preimage_matches_its_own_condition_only() {
        let fulfillment = Fulfillment::from_preimage(b"roses are red".to_vec());
        let other = Fulfillment::from_preimage(b"violets are blue".to_vec());

        assert!(PreimageSha256Verifier.verify(&fulfillment, &fulfillment.condition()));
        assert!(!PreimageSha256Verifier.verify(&other, &fulfillment.condition()));
    }
}
