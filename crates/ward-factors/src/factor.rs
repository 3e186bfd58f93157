//! Factor kinds and the factor collection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ward_core::{FactorId, IdentityId};

/// The closed set of second-factor credential kinds
///
/// Serde names match the audit vocabulary of the surrounding system, so
/// per-kind counts serialize directly into analytics payloads.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// SMS/voice-capable phone number
    Phone,
    /// Authenticator-app shared secret (TOTP)
    Totp,
    /// Hardware-backed public-key credential (WebAuthn)
    Webauthn,
    /// Government smart-card credential
    PivCac,
    /// User-held recovery secret
    PersonalKey,
}

impl FactorKind {
    /// Audit label for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorKind::Phone => "phone",
            FactorKind::Totp => "totp",
            FactorKind::Webauthn => "webauthn",
            FactorKind::PivCac => "piv_cac",
            FactorKind::PersonalKey => "personal_key",
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured second-factor credential
///
/// A factor belongs to exactly one identity; it is never shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    /// Configuration identifier
    pub id: FactorId,
    /// Owning identity
    pub owner: IdentityId,
    /// Credential kind
    pub kind: FactorKind,
    /// Whether the factor currently counts toward authentication
    pub enabled: bool,
    /// Epoch second at which possession was proven, if confirmed
    pub confirmed_at: Option<u64>,
}

impl Factor {
    /// Create an enabled, unconfirmed factor
    pub fn new(owner: IdentityId, kind: FactorKind) -> Self {
        Self {
            id: FactorId::new(),
            owner,
            kind,
            enabled: true,
            confirmed_at: None,
        }
    }

    /// Record the confirmation timestamp
    pub fn with_confirmed_at(mut self, epoch_secs: u64) -> Self {
        self.confirmed_at = Some(epoch_secs);
        self
    }

    /// Stop the factor counting toward authentication
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

/// Collection wrapper so factor sets are never handled as raw vectors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorSet {
    factors: Vec<Factor>,
}

impl FactorSet {
    /// Create from factors
    pub fn new(factors: Vec<Factor>) -> Self {
        Self { factors }
    }

    /// Number of configured factors, enabled or not
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether no factors are configured
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Iterate over all configured factors
    pub fn iter(&self) -> impl Iterator<Item = &Factor> {
        self.factors.iter()
    }

    /// Iterate over enabled factors only
    pub fn enabled_iter(&self) -> impl Iterator<Item = &Factor> {
        self.factors.iter().filter(|factor| factor.enabled)
    }

    /// Number of enabled factors
    pub fn enabled_count(&self) -> usize {
        self.enabled_iter().count()
    }

    /// Lookup by configuration id
    pub fn by_id(&self, id: FactorId) -> Option<&Factor> {
        self.factors.iter().find(|factor| factor.id == id)
    }

    /// Mutable lookup by configuration id
    pub fn by_id_mut(&mut self, id: FactorId) -> Option<&mut Factor> {
        self.factors.iter_mut().find(|factor| factor.id == id)
    }

    /// First enabled factor of the given kind
    pub fn first_of_kind(&self, kind: FactorKind) -> Option<&Factor> {
        self.enabled_iter().find(|factor| factor.kind == kind)
    }

    /// Append a factor
    pub fn push(&mut self, factor: Factor) {
        self.factors.push(factor);
    }

    /// Remove a factor by configuration id
    pub fn remove(&mut self, id: FactorId) -> Option<Factor> {
        let index = self.factors.iter().position(|factor| factor.id == id)?;
        Some(self.factors.remove(index))
    }

    /// Enabled factor counts per kind, the audit side-channel shape
    pub fn counts_by_kind(&self) -> BTreeMap<FactorKind, usize> {
        let mut counts = BTreeMap::new();
        for factor in self.enabled_iter() {
            *counts.entry(factor.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Convert into inner vector
    pub fn into_vec(self) -> Vec<Factor> {
        self.factors
    }
}

impl<'a> IntoIterator for &'a FactorSet {
    type Item = &'a Factor;
    type IntoIter = std::slice::Iter<'a, Factor>;

    fn into_iter(self) -> Self::IntoIter {
        self.factors.iter()
    }
}

impl FromIterator<Factor> for FactorSet {
    fn from_iter<I: IntoIterator<Item = Factor>>(iter: I) -> Self {
        Self {
            factors: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ignore_disabled_factors() {
        let owner = IdentityId::new();
        let mut phone = Factor::new(owner, FactorKind::Phone);
        let webauthn = Factor::new(owner, FactorKind::Webauthn);
        phone.disable();

        let set = FactorSet::new(vec![phone, webauthn]);
        let counts = set.counts_by_kind();
        assert_eq!(counts.get(&FactorKind::Webauthn), Some(&1));
        assert_eq!(counts.get(&FactorKind::Phone), None);
        assert_eq!(set.enabled_count(), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_returns_the_factor() {
        let owner = IdentityId::new();
        let factor = Factor::new(owner, FactorKind::PivCac);
        let id = factor.id;
        let mut set = FactorSet::new(vec![factor]);

        let removed = set.remove(id);
        assert_eq!(removed.map(|f| f.kind), Some(FactorKind::PivCac));
        assert!(set.is_empty());
        assert!(set.remove(id).is_none());
    }

    #[test]
    fn kind_labels_match_audit_vocabulary() {
        assert_eq!(FactorKind::PivCac.as_str(), "piv_cac");
        assert_eq!(FactorKind::Webauthn.to_string(), "webauthn");
    }
}
