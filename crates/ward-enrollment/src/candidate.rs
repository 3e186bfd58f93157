//! The transient enrollment candidate
//!
//! A candidate is one identity's one attempt to enroll an authenticator
//! app: a freshly generated secret plus the scope it was issued for. It
//! has no persisted identity; it lives only as a value held by the
//! caller, and its secret is zeroized when the value is dropped.

use ward_core::{EnrollmentId, IdentityId, SessionId};
use ward_factors::TotpSecret;

/// One pending authenticator-app enrollment attempt
#[derive(Debug, Clone)]
pub struct EnrollmentCandidate {
    /// Attempt identifier, for logs
    pub id: EnrollmentId,
    /// Session the secret was issued to
    pub session_id: SessionId,
    /// Identity enrolling the factor
    pub identity_id: IdentityId,
    /// Epoch second of issuance; expiry counts from here
    pub issued_at: u64,
    secret: TotpSecret,
}

impl EnrollmentCandidate {
    /// Issue a fresh candidate for a (session, identity) pair
    pub fn issue(session_id: SessionId, identity_id: IdentityId, now: u64, secret_len: usize) -> Self {
        Self {
            id: EnrollmentId::new(),
            session_id,
            identity_id,
            issued_at: now,
            secret: TotpSecret::generate(secret_len),
        }
    }

    /// The shared secret the user's authenticator holds
    pub fn secret(&self) -> &TotpSecret {
        &self.secret
    }

    /// Whether this candidate was issued to the given scope
    pub fn issued_for(&self, session_id: SessionId, identity_id: IdentityId) -> bool {
        self.session_id == session_id && self.identity_id == identity_id
    }

    /// Whether the candidate has outlived its usable window
    pub fn is_expired(&self, now: u64, ttl_secs: u64) -> bool {
        now >= self.issued_at.saturating_add(ttl_secs)
    }
}
