//! Minimum-factor-diversity policy engine
//!
//! A pure decision function: given the current factor set and a proposed
//! removal/disable, decide whether the mutation is permitted and report
//! per-kind counts either way. The engine never mutates anything and never
//! touches storage; callers apply permitted mutations themselves.

use crate::factor::{Factor, FactorKind, FactorSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ward_core::{CountBasis, PolicyConfig, WardError};

/// Outcome of one policy evaluation
///
/// `counts_by_kind` is populated on success and failure alike; it is the
/// audit side-channel the surrounding system logs with every decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Whether the proposed mutation is permitted
    pub allowed: bool,
    /// Field-keyed violation messages, empty when allowed
    pub violations: BTreeMap<String, Vec<String>>,
    /// Enabled factor counts per kind at evaluation time
    pub counts_by_kind: BTreeMap<FactorKind, usize>,
}

impl PolicyDecision {
    /// Convert a rejecting decision into the error surfaced to callers
    pub fn into_error(self) -> WardError {
        WardError::PolicyViolation {
            violations: self.violations,
            counts_by_kind: self
                .counts_by_kind
                .into_iter()
                .map(|(kind, count)| (kind.as_str().to_string(), count))
                .collect(),
        }
    }
}

/// The minimum-diversity decision function
#[derive(Debug, Clone)]
pub struct FactorPolicyEngine {
    config: PolicyConfig,
}

impl FactorPolicyEngine {
    /// Create an engine with the given policy configuration
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Decide whether removing or disabling `target` is permitted
    ///
    /// A target that is not in the set, or already disabled, is permitted:
    /// it cannot reduce diversity, and absence is the caller's not-found
    /// concern, not a policy violation.
    pub fn evaluate(&self, factors: &FactorSet, target: &Factor) -> PolicyDecision {
        let counts_by_kind = factors.counts_by_kind();
        let enabled_total: usize = counts_by_kind.values().sum();

        let target_is_counted = factors
            .by_id(target.id)
            .map(|factor| factor.enabled)
            .unwrap_or(false);

        let compared = match self.config.count_basis {
            CountBasis::BeforeMutation => enabled_total,
            CountBasis::AfterMutation => enabled_total.saturating_sub(1),
        };

        let allowed = !target_is_counted || compared >= self.config.min_factor_count;

        let mut violations = BTreeMap::new();
        if !allowed {
            violations.insert(
                "identity".to_string(),
                vec![format!(
                    "must have {} or more enabled factors",
                    match self.config.count_basis {
                        CountBasis::BeforeMutation => self.config.min_factor_count,
                        // Surface the rule in pre-mutation terms either way
                        CountBasis::AfterMutation => self.config.min_factor_count + 1,
                    }
                )],
            );
        }

        PolicyDecision {
            allowed,
            violations,
            counts_by_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ward_core::IdentityId;

    fn set_of(owner: IdentityId, kinds: &[FactorKind]) -> FactorSet {
        kinds.iter().map(|kind| Factor::new(owner, *kind)).collect()
    }

    fn engine(min: usize, basis: CountBasis) -> FactorPolicyEngine {
        FactorPolicyEngine::new(PolicyConfig {
            min_factor_count: min,
            count_basis: basis,
        })
    }

    #[test]
    fn two_factors_block_deletion_at_minimum_three() {
        let owner = IdentityId::new();
        let factors = set_of(owner, &[FactorKind::Phone, FactorKind::Webauthn]);
        let phone = factors.first_of_kind(FactorKind::Phone).unwrap().clone();

        let decision = engine(3, CountBasis::BeforeMutation).evaluate(&factors, &phone);

        assert!(!decision.allowed);
        assert_eq!(
            decision.violations.get("identity"),
            Some(&vec!["must have 3 or more enabled factors".to_string()])
        );
        assert_eq!(decision.counts_by_kind.get(&FactorKind::Phone), Some(&1));
        assert_eq!(decision.counts_by_kind.get(&FactorKind::Webauthn), Some(&1));
    }

    #[test]
    fn deletion_allowed_when_minimum_satisfied() {
        let owner = IdentityId::new();
        let factors = set_of(owner, &[FactorKind::Phone, FactorKind::PivCac]);
        let phone = factors.first_of_kind(FactorKind::Phone).unwrap().clone();

        let decision = engine(2, CountBasis::BeforeMutation).evaluate(&factors, &phone);

        assert!(decision.allowed);
        assert!(decision.violations.is_empty());
        assert_eq!(decision.counts_by_kind.get(&FactorKind::PivCac), Some(&1));
    }

    #[test]
    fn both_counting_bases_agree_on_equivalent_thresholds() {
        let owner = IdentityId::new();
        let factors = set_of(
            owner,
            &[FactorKind::Phone, FactorKind::Webauthn, FactorKind::Totp],
        );
        let phone = factors.first_of_kind(FactorKind::Phone).unwrap().clone();

        // min 3 counted before removal == min 2 counted after removal
        let before = engine(3, CountBasis::BeforeMutation).evaluate(&factors, &phone);
        let after = engine(2, CountBasis::AfterMutation).evaluate(&factors, &phone);
        assert!(before.allowed);
        assert!(after.allowed);

        let two = set_of(owner, &[FactorKind::Phone, FactorKind::Webauthn]);
        let phone = two.first_of_kind(FactorKind::Phone).unwrap().clone();
        assert!(!engine(3, CountBasis::BeforeMutation).evaluate(&two, &phone).allowed);
        assert!(!engine(2, CountBasis::AfterMutation).evaluate(&two, &phone).allowed);
    }

    #[test]
    fn disabled_or_absent_target_is_permitted() {
        let owner = IdentityId::new();
        let mut factors = set_of(owner, &[FactorKind::Phone, FactorKind::Webauthn]);
        let absent = Factor::new(owner, FactorKind::Totp);
        let eng = engine(3, CountBasis::BeforeMutation);

        assert!(eng.evaluate(&factors, &absent).allowed);

        let phone_id = factors.first_of_kind(FactorKind::Phone).unwrap().id;
        if let Some(phone) = factors.by_id_mut(phone_id) {
            phone.disable();
        }
        let disabled = factors.by_id(phone_id).unwrap().clone();
        assert!(eng.evaluate(&factors, &disabled).allowed);
    }

    #[test]
    fn counts_reported_even_on_success() {
        let owner = IdentityId::new();
        let factors = set_of(
            owner,
            &[FactorKind::Phone, FactorKind::Phone, FactorKind::PivCac],
        );
        let phone = factors.first_of_kind(FactorKind::Phone).unwrap().clone();

        let decision = engine(3, CountBasis::BeforeMutation).evaluate(&factors, &phone);
        assert!(decision.allowed);
        assert_eq!(decision.counts_by_kind.get(&FactorKind::Phone), Some(&2));
        assert_eq!(decision.counts_by_kind.get(&FactorKind::PivCac), Some(&1));
    }

    proptest! {
        /// Identical inputs yield identical output and leave inputs intact.
        #[test]
        fn evaluate_is_pure(min in 0usize..6, kinds in proptest::collection::vec(0u8..5, 0..8)) {
            let owner = IdentityId::new();
            let all = [
                FactorKind::Phone,
                FactorKind::Totp,
                FactorKind::Webauthn,
                FactorKind::PivCac,
                FactorKind::PersonalKey,
            ];
            let factors: FactorSet = kinds
                .iter()
                .map(|k| Factor::new(owner, all[*k as usize]))
                .collect();
            let target = factors
                .iter()
                .next()
                .cloned()
                .unwrap_or_else(|| Factor::new(owner, FactorKind::Phone));

            let eng = engine(min, CountBasis::BeforeMutation);
            let snapshot = factors.clone();
            let first = eng.evaluate(&factors, &target);
            let second = eng.evaluate(&factors, &target);

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&factors, &snapshot);
        }
    }
}
