//! Reset-request persistence effect trait
//!
//! Token lookups return whatever record the store's index found; callers
//! re-verify the match in constant time before acting. Updates are
//! compare-and-swap on the record's version counter.

use crate::request::AccountResetRequest;
use async_trait::async_trait;
use std::sync::Arc;
use ward_core::{IdentityId, Result};
use ward_factors::Identity;

/// CRUD plus atomic completion for reset requests
#[async_trait]
pub trait ResetStore: Send + Sync {
    /// Insert a new request record
    async fn insert_request(&self, request: &AccountResetRequest) -> Result<()>;

    /// Persist a mutated request
    ///
    /// Succeeds only if `request.version` still matches the stored record;
    /// the store bumps the version on success and returns a
    /// version-conflict persistence error otherwise.
    async fn update_request(&self, request: &AccountResetRequest) -> Result<()>;

    /// The identity's active (non-terminal) request, if any
    async fn active_request_for(
        &self,
        identity_id: IdentityId,
    ) -> Result<Option<AccountResetRequest>>;

    /// Locate a request by live request token
    async fn find_by_request_token(&self, token: &str) -> Result<Option<AccountResetRequest>>;

    /// Locate a request by live grant token
    async fn find_by_grant_token(&self, token: &str) -> Result<Option<AccountResetRequest>>;

    /// Atomically persist a completed request and the identity whose
    /// factor set it replaced
    ///
    /// Both writes are version-checked; either both land or neither does,
    /// so a failure leaves the pre-transaction state for caller retry.
    async fn complete_reset(
        &self,
        request: &AccountResetRequest,
        identity: &Identity,
    ) -> Result<()>;
}

#[async_trait]
impl<T: ResetStore + ?Sized> ResetStore for Arc<T> {
    async fn insert_request(&self, request: &AccountResetRequest) -> Result<()> {
        (**self).insert_request(request).await
    }

    async fn update_request(&self, request: &AccountResetRequest) -> Result<()> {
        (**self).update_request(request).await
    }

    async fn active_request_for(
        &self,
        identity_id: IdentityId,
    ) -> Result<Option<AccountResetRequest>> {
        (**self).active_request_for(identity_id).await
    }

    async fn find_by_request_token(&self, token: &str) -> Result<Option<AccountResetRequest>> {
        (**self).find_by_request_token(token).await
    }

    async fn find_by_grant_token(&self, token: &str) -> Result<Option<AccountResetRequest>> {
        (**self).find_by_grant_token(token).await
    }

    async fn complete_reset(
        &self,
        request: &AccountResetRequest,
        identity: &Identity,
    ) -> Result<()> {
        (**self).complete_reset(request, identity).await
    }
}
