//! The enrollment session operations
//!
//! `begin` is idempotent per (session, identity) pair: the secret is
//! generated on first entry only, so a user mid-enrollment keeps seeing a
//! QR code that matches their pending attempt. Revocation consults the
//! diversity policy before touching anything and reports audit counts on
//! every decision, allowed or not.

use crate::candidate::EnrollmentCandidate;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use ward_core::effects::{
    ClockEffects, Notification, NotificationKind, NotifierEffects, Recipient,
};
use ward_core::{
    EnrollmentConfig, FactorId, IdentityId, PolicyConfig, Result, SessionId, TotpConfig, WardError,
};
use ward_factors::{totp, Factor, FactorKind, FactorPolicyEngine, IdentityStore, PolicyDecision};

/// Result of one confirmation attempt
///
/// A wrong code hands the candidate back so the user may retry; only
/// expiry and success destroy it.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Possession proven; the factor is now part of the identity's set
    Committed(Factor),
    /// Attempt failed but the candidate is still usable
    Retry {
        /// The candidate, returned for another attempt
        candidate: EnrollmentCandidate,
        /// Why this attempt failed
        error: WardError,
    },
    /// The candidate is no longer usable and has been destroyed
    Discarded {
        /// Why the candidate was discarded
        error: WardError,
    },
}

/// Factor enrollment and policy-checked revocation
pub struct FactorEnrollmentSession {
    identities: Arc<dyn IdentityStore>,
    clock: Arc<dyn ClockEffects>,
    notifier: Arc<dyn NotifierEffects>,
    policy: FactorPolicyEngine,
    totp_config: TotpConfig,
    config: EnrollmentConfig,
}

impl FactorEnrollmentSession {
    /// Create the service over its effect handles
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        clock: Arc<dyn ClockEffects>,
        notifier: Arc<dyn NotifierEffects>,
        policy_config: PolicyConfig,
        totp_config: TotpConfig,
        config: EnrollmentConfig,
    ) -> Self {
        Self {
            identities,
            clock,
            notifier,
            policy: FactorPolicyEngine::new(policy_config),
            totp_config,
            config,
        }
    }

    /// Return the pending candidate for this scope, or issue a fresh one
    ///
    /// An unexpired candidate already issued to the pair is returned
    /// unchanged; no secret regeneration on re-entry. Expired or
    /// out-of-scope candidates are discarded and replaced.
    pub async fn begin(
        &self,
        existing: Option<EnrollmentCandidate>,
        session_id: SessionId,
        identity_id: IdentityId,
    ) -> EnrollmentCandidate {
        let now = self.clock.now().await;
        if let Some(candidate) = existing {
            if candidate.issued_for(session_id, identity_id)
                && !candidate.is_expired(now, self.config.candidate_ttl_secs)
            {
                return candidate;
            }
            debug!(candidate = %candidate.id, "discarding stale enrollment candidate");
        }

        let candidate =
            EnrollmentCandidate::issue(session_id, identity_id, now, self.totp_config.secret_len);
        debug!(candidate = %candidate.id, identity = %identity_id, "enrollment secret issued");
        candidate
    }

    /// Discard any pending candidate and issue a fresh secret
    pub async fn reset(
        &self,
        session_id: SessionId,
        identity_id: IdentityId,
    ) -> EnrollmentCandidate {
        let now = self.clock.now().await;
        EnrollmentCandidate::issue(session_id, identity_id, now, self.totp_config.secret_len)
    }

    /// `otpauth://` URI for the candidate, for QR rendering by the caller
    pub fn provisioning_uri(&self, candidate: &EnrollmentCandidate, account: &str) -> String {
        totp::provisioning_uri(candidate.secret(), account, &self.totp_config)
    }

    /// Prove possession of the candidate secret and commit the factor
    pub async fn confirm(
        &self,
        candidate: EnrollmentCandidate,
        submitted_code: &str,
    ) -> ConfirmOutcome {
        let now = self.clock.now().await;

        if candidate.is_expired(now, self.config.candidate_ttl_secs) {
            debug!(candidate = %candidate.id, "enrollment candidate expired");
            return ConfirmOutcome::Discarded {
                error: WardError::CandidateExpired,
            };
        }

        if !totp::verify(candidate.secret(), submitted_code, now, &self.totp_config) {
            return ConfirmOutcome::Retry {
                candidate,
                error: WardError::InvalidCode,
            };
        }

        let mut identity = match self.identities.load_identity(candidate.identity_id).await {
            Ok(identity) => identity,
            Err(error) => return ConfirmOutcome::Retry { candidate, error },
        };

        let factor = Factor::new(identity.id, FactorKind::Totp).with_confirmed_at(now);
        if let Err(error) = identity.add_factor(factor.clone()) {
            return ConfirmOutcome::Retry { candidate, error };
        }
        if let Err(error) = self.identities.update_identity(&identity).await {
            return ConfirmOutcome::Retry { candidate, error };
        }

        info!(identity = %identity.id, factor = %factor.id, "authenticator factor enrolled");
        ConfirmOutcome::Committed(factor)
    }

    /// Explicitly destroy a pending candidate
    pub fn abandon(&self, candidate: EnrollmentCandidate) {
        debug!(candidate = %candidate.id, "enrollment candidate abandoned");
        drop(candidate);
    }

    /// Disable a factor, subject to the minimum-diversity policy
    pub async fn disable(
        &self,
        identity_id: IdentityId,
        factor_id: FactorId,
    ) -> Result<PolicyDecision> {
        self.revoke(identity_id, factor_id, RevokeMode::Disable).await
    }

    /// Delete a factor configuration, subject to the minimum-diversity policy
    pub async fn delete(
        &self,
        identity_id: IdentityId,
        factor_id: FactorId,
    ) -> Result<PolicyDecision> {
        self.revoke(identity_id, factor_id, RevokeMode::Delete).await
    }

    async fn revoke(
        &self,
        identity_id: IdentityId,
        factor_id: FactorId,
        mode: RevokeMode,
    ) -> Result<PolicyDecision> {
        let mut identity = self.identities.load_identity(identity_id).await?;
        let Some(target) = identity.factors.by_id(factor_id).cloned() else {
            return Err(WardError::not_found(format!(
                "factor {factor_id} is not configured on {identity_id}"
            )));
        };

        let decision = self.policy.evaluate(&identity.factors, &target);
        info!(
            identity = %identity_id,
            factor = %factor_id,
            kind = %target.kind,
            allowed = decision.allowed,
            counts = ?decision.counts_by_kind,
            "factor revocation evaluated"
        );
        if !decision.allowed {
            return Err(decision.into_error());
        }

        match mode {
            RevokeMode::Disable => {
                if let Some(factor) = identity.factors.by_id_mut(factor_id) {
                    factor.disable();
                }
            }
            RevokeMode::Delete => {
                identity.factors.remove(factor_id);
            }
        }
        self.identities.update_identity(&identity).await?;

        let payload = json!({
            "configuration_id": factor_id,
            "kind": target.kind,
            "mfa_method_counts": identity.factors.counts_by_kind(),
        });
        for email in &identity.email_addresses {
            self.dispatch(
                Recipient::Email(email.clone()),
                Notification::new(NotificationKind::FactorRevoked, identity.id, payload.clone()),
            )
            .await;
        }

        info!(identity = %identity_id, factor = %factor_id, "factor revoked");
        Ok(decision)
    }

    async fn dispatch(&self, recipient: Recipient, notification: Notification) {
        if let Err(error) = self.notifier.notify(recipient.clone(), notification).await {
            warn!(?recipient, %error, "notification dispatch failed");
        }
    }
}

enum RevokeMode {
    Disable,
    Delete,
}
