//! Identity persistence effect trait
//!
//! Bounds only what the factor and enrollment flows need: load an
//! identity, write one back. Writes are compare-and-swap on the record's
//! version counter; a lost race surfaces as a persistence error the
//! caller may retry, never a silent overwrite.

use crate::identity::Identity;
use async_trait::async_trait;
use std::sync::Arc;
use ward_core::{IdentityId, Result};

/// CRUD surface for identities and their factor sets
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Load an identity by id
    async fn load_identity(&self, id: IdentityId) -> Result<Identity>;

    /// Insert a new identity record
    async fn insert_identity(&self, identity: &Identity) -> Result<()>;

    /// Persist a mutated identity
    ///
    /// The write succeeds only if `identity.version` still matches the
    /// stored record; the store bumps the version on success and returns
    /// a version-conflict persistence error otherwise.
    async fn update_identity(&self, identity: &Identity) -> Result<()>;
}

#[async_trait]
impl<T: IdentityStore + ?Sized> IdentityStore for Arc<T> {
    async fn load_identity(&self, id: IdentityId) -> Result<Identity> {
        (**self).load_identity(id).await
    }

    async fn insert_identity(&self, identity: &Identity) -> Result<()> {
        (**self).insert_identity(identity).await
    }

    async fn update_identity(&self, identity: &Identity) -> Result<()> {
        (**self).update_identity(identity).await
    }
}
