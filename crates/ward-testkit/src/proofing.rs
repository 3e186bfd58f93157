//! Proofing oracles with fixed answers

use async_trait::async_trait;
use ward_core::effects::ProofingEffects;
use ward_core::{IdentityId, Result, WardError};

/// Oracle that answers the same for every identity
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedProofingOracle {
    verified: bool,
}

impl FixedProofingOracle {
    /// Oracle reporting every identity below the highest assurance level
    pub fn unverified() -> Self {
        Self { verified: false }
    }

    /// Oracle reporting every identity at the highest assurance level
    pub fn verified() -> Self {
        Self { verified: true }
    }
}

#[async_trait]
impl ProofingEffects for FixedProofingOracle {
    async fn is_highest_assurance_verified(&self, _identity_id: IdentityId) -> Result<bool> {
        Ok(self.verified)
    }
}

/// Oracle that always errors, for fail-closed tests
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingProofingOracle;

#[async_trait]
impl ProofingEffects for FailingProofingOracle {
    async fn is_highest_assurance_verified(&self, _identity_id: IdentityId) -> Result<bool> {
        Err(WardError::persistence("proofing oracle unavailable"))
    }
}
