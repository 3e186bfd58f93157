//! Identity and factor fixtures

use ward_factors::{Factor, FactorKind, Identity};

/// Identity with one confirmed email and one enabled factor per kind given
///
/// A confirmed phone number is attached whenever a phone factor is in the
/// list, matching how the notification fan-out decides on the SMS channel.
pub fn identity_with_factors(kinds: &[FactorKind]) -> Identity {
    let mut identity = Identity::new(vec!["user@example.com".to_string()]);
    if kinds.contains(&FactorKind::Phone) {
        identity = identity.with_phone("+12025551234");
    }
    for kind in kinds {
        let factor = Factor::new(identity.id, *kind).with_confirmed_at(0);
        // fixtures only ever add factors they own; the check cannot fail
        let _ = identity.add_factor(factor);
    }
    identity
}
