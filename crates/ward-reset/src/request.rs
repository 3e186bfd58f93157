//! The reset-request record and its transitions
//!
//! Transitions live on the type so every caller goes through the same
//! state checks; the lifecycle service only orchestrates effects around
//! them. The record carries a version counter for compare-and-swap
//! persistence: concurrent writers on the same identity lose explicitly
//! instead of silently clobbering each other's tokens.

use serde::{Deserialize, Serialize};
use ward_core::{IdentityId, ResetRequestId, ResetToken, Result, WardError};

/// Observable state of one reset request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetState {
    /// Waiting period running; the request token doubles as the
    /// cancellation capability
    Requested,
    /// Waiting period elapsed and a grant token issued
    Granted,
    /// Cancelled by token, by supersede, or administratively; terminal
    Cancelled,
    /// Grant token consumed and the factor set replaced; terminal
    Completed,
}

/// One in-flight recovery attempt for an identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResetRequest {
    /// Request identifier
    pub id: ResetRequestId,
    /// Identity being recovered
    pub identity_id: IdentityId,
    /// Epoch second of creation; the waiting period counts from here
    pub requested_at: u64,
    /// Live request/cancellation token; cleared on any terminal transition
    pub request_token: Option<ResetToken>,
    /// Live grant token; present only while Granted
    pub granted_token: Option<ResetToken>,
    /// Epoch second the grant was issued
    pub granted_at: Option<u64>,
    /// Epoch second of cancellation
    pub cancelled_at: Option<u64>,
    /// Epoch second of completion
    pub completed_at: Option<u64>,
    /// Audit flag: the user reported the request as not theirs
    pub reported_suspicious: bool,
    /// Optimistic-concurrency guard, bumped by the store on every write
    pub version: u64,
}

impl AccountResetRequest {
    /// Create a fresh request with a newly generated request token
    pub fn new(identity_id: IdentityId, now: u64) -> Self {
        Self {
            id: ResetRequestId::new(),
            identity_id,
            requested_at: now,
            request_token: Some(ResetToken::generate()),
            granted_token: None,
            granted_at: None,
            cancelled_at: None,
            completed_at: None,
            reported_suspicious: false,
            version: 0,
        }
    }

    /// Current state, derived from the audit timestamps
    pub fn state(&self) -> ResetState {
        if self.completed_at.is_some() {
            ResetState::Completed
        } else if self.cancelled_at.is_some() {
            ResetState::Cancelled
        } else if self.granted_at.is_some() {
            ResetState::Granted
        } else {
            ResetState::Requested
        }
    }

    /// Whether the request can never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self.state(), ResetState::Cancelled | ResetState::Completed)
    }

    /// Epoch second at which the waiting period elapses
    pub fn grant_ready_at(&self, waiting_period_secs: u64) -> u64 {
        self.requested_at.saturating_add(waiting_period_secs)
    }

    /// Cancel the request, clearing both tokens
    ///
    /// Used for the token-presented path, for administrative cancellation,
    /// and for supersede by a newer request. Fails on terminal requests.
    pub fn cancel(&mut self, now: u64) -> Result<()> {
        if self.is_terminal() {
            return Err(WardError::invalid_state(format!(
                "cannot cancel a {:?} request",
                self.state()
            )));
        }
        self.cancelled_at = Some(now);
        self.request_token = None;
        self.granted_token = None;
        Ok(())
    }

    /// Issue the grant token once the waiting period has elapsed
    ///
    /// The caller checks the waiting period; this transition only enforces
    /// state. A second grant on an already-granted request is a defect,
    /// not a silent reissue.
    pub fn mark_granted(&mut self, now: u64) -> Result<ResetToken> {
        match self.state() {
            ResetState::Requested => {
                let token = ResetToken::generate();
                self.granted_token = Some(token.clone());
                self.granted_at = Some(now);
                Ok(token)
            }
            ResetState::Granted => Err(WardError::invalid_state(
                "grant token already issued for this request",
            )),
            state => Err(WardError::invalid_state(format!(
                "cannot grant a {state:?} request"
            ))),
        }
    }

    /// Consume the grant and close the request, clearing both tokens
    pub fn mark_completed(&mut self, now: u64) -> Result<()> {
        match self.state() {
            ResetState::Granted => {
                self.completed_at = Some(now);
                self.request_token = None;
                self.granted_token = None;
                Ok(())
            }
            state => Err(WardError::invalid_state(format!(
                "cannot complete a {state:?} request"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn fresh_request_is_requested_with_a_live_token() {
        let request = AccountResetRequest::new(IdentityId::new(), 100);
        assert_eq!(request.state(), ResetState::Requested);
        assert!(request.request_token.is_some());
        assert!(request.granted_token.is_none());
        assert!(!request.is_terminal());
    }

    #[test]
    fn cancel_clears_both_tokens_and_is_terminal() {
        let mut request = AccountResetRequest::new(IdentityId::new(), 100);
        request.mark_granted(200).unwrap();

        request.cancel(300).unwrap();
        assert_eq!(request.state(), ResetState::Cancelled);
        assert!(request.request_token.is_none());
        assert!(request.granted_token.is_none());

        assert_matches!(request.cancel(400), Err(WardError::InvalidState { .. }));
    }

    #[test]
    fn second_grant_is_a_defect_not_a_reissue() {
        let mut request = AccountResetRequest::new(IdentityId::new(), 100);
        request.mark_granted(200).unwrap();
        assert_matches!(
            request.mark_granted(201),
            Err(WardError::InvalidState { .. })
        );
    }

    #[test]
    fn complete_requires_a_granted_request() {
        let mut request = AccountResetRequest::new(IdentityId::new(), 100);
        assert_matches!(
            request.mark_completed(150),
            Err(WardError::InvalidState { .. })
        );

        request.mark_granted(200).unwrap();
        request.mark_completed(250).unwrap();
        assert_eq!(request.state(), ResetState::Completed);
        assert!(request.granted_token.is_none());

        // terminal and immutable thereafter
        assert_matches!(request.cancel(300), Err(WardError::InvalidState { .. }));
    }

    #[test]
    fn grant_ready_at_counts_from_creation() {
        let request = AccountResetRequest::new(IdentityId::new(), 1_000);
        assert_eq!(request.grant_ready_at(86_400), 87_400);
    }
}
