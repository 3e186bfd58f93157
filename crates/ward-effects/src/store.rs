//! In-memory versioned store
//!
//! Reference implementation of `IdentityStore` and `ResetStore`. Every
//! record carries a version counter; writes compare-and-swap on it and a
//! lost race surfaces as a version conflict for caller retry. Lock order
//! is identities before requests everywhere both are held.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use ward_core::token::matches_opt;
use ward_core::{IdentityId, ResetRequestId, Result, WardError};
use ward_factors::{Identity, IdentityStore};
use ward_reset::{AccountResetRequest, ResetStore};

/// In-memory store for identities and reset requests
#[derive(Debug, Default)]
pub struct MemoryStore {
    identities: Mutex<HashMap<IdentityId, Identity>>,
    requests: Mutex<HashMap<ResetRequestId, AccountResetRequest>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn load_identity(&self, id: IdentityId) -> Result<Identity> {
        self.identities
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| WardError::not_found(format!("identity {id}")))
    }

    async fn insert_identity(&self, identity: &Identity) -> Result<()> {
        let mut identities = self.identities.lock().await;
        if identities.contains_key(&identity.id) {
            return Err(WardError::persistence(format!(
                "identity {} already exists",
                identity.id
            )));
        }
        identities.insert(identity.id, identity.clone());
        Ok(())
    }

    async fn update_identity(&self, identity: &Identity) -> Result<()> {
        let mut identities = self.identities.lock().await;
        let stored = identities
            .get_mut(&identity.id)
            .ok_or_else(|| WardError::not_found(format!("identity {}", identity.id)))?;
        if stored.version != identity.version {
            return Err(WardError::version_conflict(format!(
                "identity {}",
                identity.id
            )));
        }
        let mut updated = identity.clone();
        updated.version += 1;
        *stored = updated;
        Ok(())
    }
}

#[async_trait]
impl ResetStore for MemoryStore {
    async fn insert_request(&self, request: &AccountResetRequest) -> Result<()> {
        let mut requests = self.requests.lock().await;
        if requests.contains_key(&request.id) {
            return Err(WardError::persistence(format!(
                "reset request {} already exists",
                request.id
            )));
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn update_request(&self, request: &AccountResetRequest) -> Result<()> {
        let mut requests = self.requests.lock().await;
        let stored = requests
            .get_mut(&request.id)
            .ok_or_else(|| WardError::not_found(format!("reset request {}", request.id)))?;
        if stored.version != request.version {
            return Err(WardError::version_conflict(format!(
                "reset request {}",
                request.id
            )));
        }
        let mut updated = request.clone();
        updated.version += 1;
        *stored = updated;
        Ok(())
    }

    async fn active_request_for(
        &self,
        identity_id: IdentityId,
    ) -> Result<Option<AccountResetRequest>> {
        let requests = self.requests.lock().await;
        let mut active = requests
            .values()
            .filter(|request| request.identity_id == identity_id && !request.is_terminal());
        let first = active.next().cloned();
        if active.next().is_some() {
            // the single-active-request invariant is broken; a defect
            return Err(WardError::internal(format!(
                "multiple active reset requests for {identity_id}"
            )));
        }
        Ok(first)
    }

    async fn find_by_request_token(&self, token: &str) -> Result<Option<AccountResetRequest>> {
        let requests = self.requests.lock().await;
        Ok(requests
            .values()
            .find(|request| matches_opt(token, request.request_token.as_ref()))
            .cloned())
    }

    async fn find_by_grant_token(&self, token: &str) -> Result<Option<AccountResetRequest>> {
        let requests = self.requests.lock().await;
        Ok(requests
            .values()
            .find(|request| matches_opt(token, request.granted_token.as_ref()))
            .cloned())
    }

    async fn complete_reset(
        &self,
        request: &AccountResetRequest,
        identity: &Identity,
    ) -> Result<()> {
        let mut identities = self.identities.lock().await;
        let mut requests = self.requests.lock().await;

        // validate both versions before writing either record
        let stored_identity = identities
            .get(&identity.id)
            .ok_or_else(|| WardError::not_found(format!("identity {}", identity.id)))?;
        if stored_identity.version != identity.version {
            return Err(WardError::version_conflict(format!(
                "identity {}",
                identity.id
            )));
        }
        let stored_request = requests
            .get(&request.id)
            .ok_or_else(|| WardError::not_found(format!("reset request {}", request.id)))?;
        if stored_request.version != request.version {
            return Err(WardError::version_conflict(format!(
                "reset request {}",
                request.id
            )));
        }

        let mut updated_identity = identity.clone();
        updated_identity.version += 1;
        identities.insert(identity.id, updated_identity);

        let mut updated_request = request.clone();
        updated_request.version += 1;
        requests.insert(request.id, updated_request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn update_identity_rejects_stale_versions() {
        let store = MemoryStore::new();
        let identity = Identity::new(vec!["a@example.com".to_string()]);
        store.insert_identity(&identity).await.unwrap();

        // first writer wins and bumps the stored version
        store.update_identity(&identity).await.unwrap();

        // second writer still holds version 0 and must lose
        let err = store.update_identity(&identity).await.unwrap_err();
        assert_matches!(err, WardError::Persistence { .. });

        let reloaded = store.load_identity(identity.id).await.unwrap();
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn active_request_lookup_skips_terminal_requests() {
        let store = MemoryStore::new();
        let identity_id = IdentityId::new();

        let mut cancelled = AccountResetRequest::new(identity_id, 10);
        cancelled.cancel(20).unwrap();
        store.insert_request(&cancelled).await.unwrap();
        assert!(store.active_request_for(identity_id).await.unwrap().is_none());

        let live = AccountResetRequest::new(identity_id, 30);
        store.insert_request(&live).await.unwrap();
        let found = store.active_request_for(identity_id).await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(live.id));
    }

    #[tokio::test]
    async fn token_lookup_finds_only_live_tokens() {
        let store = MemoryStore::new();
        let request = AccountResetRequest::new(IdentityId::new(), 10);
        let token = request.request_token.clone().unwrap();
        store.insert_request(&request).await.unwrap();

        let found = store.find_by_request_token(token.as_str()).await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(request.id));

        let mut cancelled = request.clone();
        cancelled.cancel(20).unwrap();
        store.update_request(&cancelled).await.unwrap();
        assert!(store
            .find_by_request_token(token.as_str())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn complete_reset_is_all_or_nothing() {
        let store = MemoryStore::new();
        let identity = Identity::new(vec!["a@example.com".to_string()]);
        store.insert_identity(&identity).await.unwrap();

        let mut request = AccountResetRequest::new(identity.id, 10);
        store.insert_request(&request).await.unwrap();
        request.mark_granted(20).unwrap();
        store.update_request(&request).await.unwrap();

        // request copy is stale (version 0, stored is 1): nothing may land
        let err = store.complete_reset(&request, &identity).await.unwrap_err();
        assert_matches!(err, WardError::Persistence { .. });
        assert_eq!(store.load_identity(identity.id).await.unwrap().version, 0);

        // with fresh copies both records land together
        request.version = 1;
        request.mark_completed(30).unwrap();
        store.complete_reset(&request, &identity).await.unwrap();
        assert_eq!(store.load_identity(identity.id).await.unwrap().version, 1);
    }
}
