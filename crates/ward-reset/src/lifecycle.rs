//! The lifecycle service orchestrating effects around the state machine
//!
//! Each operation is one atomic unit against the store: load, transition,
//! version-checked write, then notifications. Notifications are
//! fire-and-forget; a delivery failure is logged, never allowed to roll
//! back or retry a completed transition, so no notification is sent twice.

use crate::request::AccountResetRequest;
use crate::store::ResetStore;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use ward_core::effects::{
    ClockEffects, Notification, NotificationKind, NotifierEffects, ProofingEffects, Recipient,
};
use ward_core::token::matches_opt;
use ward_core::{IdentityId, ResetConfig, ResetToken, Result, WardError};
use ward_factors::{Factor, FactorKind, Identity, IdentityStore};

/// Account-reset lifecycle service
///
/// Reset creation deliberately bypasses the minimum-diversity policy: it
/// is the recovery path for an identity that lost every factor. The
/// waiting period plus cancellation fan-out to every confirmed channel is
/// the anti-abuse control instead.
pub struct AccountResetLifecycle {
    requests: Arc<dyn ResetStore>,
    identities: Arc<dyn IdentityStore>,
    clock: Arc<dyn ClockEffects>,
    notifier: Arc<dyn NotifierEffects>,
    proofing: Arc<dyn ProofingEffects>,
    config: ResetConfig,
}

impl AccountResetLifecycle {
    /// Create the service over its effect handles
    pub fn new(
        requests: Arc<dyn ResetStore>,
        identities: Arc<dyn IdentityStore>,
        clock: Arc<dyn ClockEffects>,
        notifier: Arc<dyn NotifierEffects>,
        proofing: Arc<dyn ProofingEffects>,
        config: ResetConfig,
    ) -> Self {
        Self {
            requests,
            identities,
            clock,
            notifier,
            proofing,
            config,
        }
    }

    /// Open a reset request for an identity
    ///
    /// Refused outright for identities verified at the highest assurance
    /// level, since a self-service reset would replace the factor set
    /// anchoring that assurance. The gate fails closed: an oracle error
    /// blocks the request. Any prior active request is superseded through an
    /// explicit, version-checked cancellation before the new one is
    /// inserted, so two concurrent creators cannot both hold a live token.
    pub async fn create_request(&self, identity_id: IdentityId) -> Result<AccountResetRequest> {
        if self.proofing.is_highest_assurance_verified(identity_id).await? {
            return Err(WardError::proofing_gate_blocked(
                "identity is verified at the highest assurance level",
            ));
        }

        let identity = self.identities.load_identity(identity_id).await?;
        let now = self.clock.now().await;

        if let Some(mut prior) = self.requests.active_request_for(identity_id).await? {
            prior.cancel(now)?;
            self.requests.update_request(&prior).await?;
            info!(identity = %identity_id, superseded = %prior.id, "prior reset request superseded");
        }

        let request = AccountResetRequest::new(identity_id, now);
        self.requests.insert_request(&request).await?;

        let payload = json!({
            "requested_at": now,
            "cancel_token": request.request_token.as_ref().map(ResetToken::as_str),
            "mfa_method_counts": identity.factors.counts_by_kind(),
        });
        self.notify_emails(&identity, NotificationKind::ResetRequested, &payload)
            .await;

        info!(identity = %identity_id, request = %request.id, "account reset requested");
        Ok(request)
    }

    /// Cancel the request whose live request token matches
    pub async fn cancel(&self, token: &str) -> Result<AccountResetRequest> {
        self.cancel_inner(token, false).await
    }

    /// Cancel and flag the request as not initiated by the account owner
    pub async fn cancel_and_flag(&self, token: &str) -> Result<AccountResetRequest> {
        self.cancel_inner(token, true).await
    }

    async fn cancel_inner(&self, token: &str, suspicious: bool) -> Result<AccountResetRequest> {
        let Some(mut request) = self.requests.find_by_request_token(token).await? else {
            return Err(WardError::invalid_token(
                "no active reset request matches the presented token",
            ));
        };
        // the store lookup may be indexed; the authoritative check is
        // constant-time against the live token
        if request.is_terminal() || !matches_opt(token, request.request_token.as_ref()) {
            return Err(WardError::invalid_token(
                "no active reset request matches the presented token",
            ));
        }

        let now = self.clock.now().await;
        request.cancel(now)?;
        request.reported_suspicious = suspicious;
        self.requests.update_request(&request).await?;

        let identity = self.identities.load_identity(request.identity_id).await?;
        let payload = json!({
            "cancelled_at": now,
            "reported_suspicious": suspicious,
        });
        self.notify_emails(&identity, NotificationKind::ResetCancelled, &payload)
            .await;
        if identity.factors.first_of_kind(FactorKind::Phone).is_some() {
            if let Some(phone) = &identity.phone {
                self.dispatch(
                    Recipient::Sms(phone.clone()),
                    Notification::new(
                        NotificationKind::ResetCancelled,
                        identity.id,
                        payload.clone(),
                    ),
                )
                .await;
            }
        }

        info!(identity = %request.identity_id, request = %request.id, suspicious, "account reset cancelled");
        Ok(request)
    }

    /// Issue the grant token once the waiting period has elapsed
    ///
    /// Invoked by the surrounding system's timer once per request; a call
    /// before `requested_at + waiting_period` fails with `TooEarly` and
    /// changes nothing, and a second call on a granted request is refused.
    pub async fn grant(&self, identity_id: IdentityId) -> Result<ResetToken> {
        let Some(mut request) = self.requests.active_request_for(identity_id).await? else {
            return Err(WardError::not_found(format!(
                "no active reset request for {identity_id}"
            )));
        };

        let now = self.clock.now().await;
        let ready_at = request.grant_ready_at(self.config.waiting_period_secs);
        if now < ready_at {
            return Err(WardError::TooEarly { ready_at });
        }

        let token = request.mark_granted(now)?;
        self.requests.update_request(&request).await?;

        let identity = self.identities.load_identity(identity_id).await?;
        let payload = json!({
            "granted_at": now,
            "grant_token": token.as_str(),
        });
        self.notify_emails(&identity, NotificationKind::ResetGranted, &payload)
            .await;

        info!(identity = %identity_id, request = %request.id, "reset grant issued");
        Ok(token)
    }

    /// Consume a grant token and replace the identity's factor set
    ///
    /// All-or-nothing: the request transition and the factor-set
    /// replacement land in one store transaction. A persistence failure
    /// leaves the pre-transaction state and is retryable by the caller.
    pub async fn complete(&self, grant_token: &str, new_factors: Vec<Factor>) -> Result<Identity> {
        let Some(mut request) = self.requests.find_by_grant_token(grant_token).await? else {
            return Err(WardError::invalid_token(
                "no granted reset request matches the presented token",
            ));
        };
        if request.is_terminal() || !matches_opt(grant_token, request.granted_token.as_ref()) {
            return Err(WardError::invalid_token(
                "no granted reset request matches the presented token",
            ));
        }

        let now = self.clock.now().await;
        let mut identity = self.identities.load_identity(request.identity_id).await?;
        identity.replace_factors(new_factors)?;
        request.mark_completed(now)?;

        self.requests.complete_reset(&request, &identity).await?;

        let payload = json!({
            "completed_at": now,
            "mfa_method_counts": identity.factors.counts_by_kind(),
        });
        self.notify_emails(&identity, NotificationKind::ResetCompleted, &payload)
            .await;

        info!(identity = %identity.id, request = %request.id, "account reset completed");
        Ok(identity)
    }

    async fn notify_emails(
        &self,
        identity: &Identity,
        kind: NotificationKind,
        payload: &serde_json::Value,
    ) {
        for email in &identity.email_addresses {
            self.dispatch(
                Recipient::Email(email.clone()),
                Notification::new(kind, identity.id, payload.clone()),
            )
            .await;
        }
    }

    async fn dispatch(&self, recipient: Recipient, notification: Notification) {
        if let Err(error) = self.notifier.notify(recipient.clone(), notification).await {
            // fire-and-forget: a refused ack must not roll back the
            // transition or trigger an internal retry
            warn!(?recipient, %error, "notification dispatch failed");
        }
    }
}
