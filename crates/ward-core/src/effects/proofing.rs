//! Identity-proofing assurance oracle
//!
//! Identities that completed the highest level of identity verification are
//! barred from self-service reset: a reset would replace the factor set
//! that anchors that assurance. The oracle is consulted by
//! `create_request` and fails closed: an oracle error blocks the request.

use crate::errors::Result;
use crate::identifiers::IdentityId;
use async_trait::async_trait;
use std::sync::Arc;

/// Assurance-level lookup for the reset eligibility gate
#[async_trait]
pub trait ProofingEffects: Send + Sync {
    /// Whether the identity holds the highest identity-assurance level
    async fn is_highest_assurance_verified(&self, identity_id: IdentityId) -> Result<bool>;
}

#[async_trait]
impl<T: ProofingEffects + ?Sized> ProofingEffects for Arc<T> {
    async fn is_highest_assurance_verified(&self, identity_id: IdentityId) -> Result<bool> {
        (**self).is_highest_assurance_verified(identity_id).await
    }
}
