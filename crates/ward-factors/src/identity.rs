//! The identity aggregate
//!
//! The surrounding system owns most of an identity; the recovery engine
//! reads its confirmed contact addresses and reads/mutates its factor set.
//! Every stored copy carries a version counter so same-identity writers
//! are serialized by compare-and-swap instead of last-write-wins.

use crate::factor::{Factor, FactorSet};
use serde::{Deserialize, Serialize};
use ward_core::{IdentityId, Result, WardError};

/// The account being protected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier
    pub id: IdentityId,
    /// Confirmed email addresses, every one of which receives
    /// security-relevant notifications
    pub email_addresses: Vec<String>,
    /// Confirmed phone number, if any, for SMS notifications
    pub phone: Option<String>,
    /// Configured second factors
    pub factors: FactorSet,
    /// Optimistic-concurrency guard, bumped by the store on every write
    pub version: u64,
}

impl Identity {
    /// Create an identity with confirmed email addresses and no factors
    pub fn new(email_addresses: Vec<String>) -> Self {
        Self {
            id: IdentityId::new(),
            email_addresses,
            phone: None,
            factors: FactorSet::default(),
            version: 0,
        }
    }

    /// Attach a confirmed phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Add a factor, enforcing that it belongs to this identity
    pub fn add_factor(&mut self, factor: Factor) -> Result<()> {
        if factor.owner != self.id {
            return Err(WardError::internal(format!(
                "factor {} belongs to {}, not {}",
                factor.id, factor.owner, self.id
            )));
        }
        self.factors.push(factor);
        Ok(())
    }

    /// Replace the whole factor set, enforcing ownership of every entry
    ///
    /// This is the reset-completion mutation: all old factors are revoked
    /// and the new set installed in one step. Callers persist the result
    /// atomically with the request transition.
    pub fn replace_factors(&mut self, new_factors: Vec<Factor>) -> Result<()> {
        for factor in &new_factors {
            if factor.owner != self.id {
                return Err(WardError::internal(format!(
                    "factor {} belongs to {}, not {}",
                    factor.id, factor.owner, self.id
                )));
            }
        }
        self.factors = FactorSet::new(new_factors);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::FactorKind;

    #[test]
    fn add_factor_rejects_foreign_owner() {
        let mut identity = Identity::new(vec!["a@example.com".to_string()]);
        let foreign = Factor::new(IdentityId::new(), FactorKind::Phone);
        assert!(identity.add_factor(foreign).is_err());
        assert!(identity.factors.is_empty());
    }

    #[test]
    fn replace_factors_swaps_the_whole_set() {
        let mut identity = Identity::new(vec!["a@example.com".to_string()]);
        identity
            .add_factor(Factor::new(identity.id, FactorKind::Phone))
            .unwrap();
        identity
            .add_factor(Factor::new(identity.id, FactorKind::Webauthn))
            .unwrap();

        let replacement = vec![Factor::new(identity.id, FactorKind::PersonalKey)];
        identity.replace_factors(replacement.clone()).unwrap();

        assert_eq!(identity.factors.len(), 1);
        assert_eq!(
            identity.factors.iter().next().map(|f| f.kind),
            Some(FactorKind::PersonalKey)
        );
    }

    #[test]
    fn replace_factors_rejects_any_foreign_entry() {
        let mut identity = Identity::new(vec!["a@example.com".to_string()]);
        identity
            .add_factor(Factor::new(identity.id, FactorKind::Phone))
            .unwrap();
        let before = identity.factors.clone();

        let mixed = vec![
            Factor::new(identity.id, FactorKind::PersonalKey),
            Factor::new(IdentityId::new(), FactorKind::Totp),
        ];
        assert!(identity.replace_factors(mixed).is_err());
        assert_eq!(identity.factors, before);
    }
}
