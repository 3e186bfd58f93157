//! Core identifier types used across the ward platform
//!
//! Each identifier is a newtype over a random v4 UUID so that ids from
//! different entity families cannot be confused at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from a UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifier for an account (the identity being protected)
    IdentityId,
    "identity"
);

uuid_id!(
    /// Identifier for one configured second-factor credential
    FactorId,
    "factor"
);

uuid_id!(
    /// Identifier for one account-reset request
    ResetRequestId,
    "reset-request"
);

uuid_id!(
    /// Identifier for a user session, used to key enrollment candidates
    SessionId,
    "session"
);

uuid_id!(
    /// Identifier for one factor-enrollment attempt
    EnrollmentId,
    "enrollment"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_unique() {
        assert_ne!(IdentityId::new(), IdentityId::new());
        assert_ne!(ResetRequestId::new(), ResetRequestId::new());
    }

    #[test]
    fn display_carries_family_prefix() {
        let id = FactorId::new();
        assert!(id.to_string().starts_with("factor-"));
    }

    #[test]
    fn uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = IdentityId::from_uuid(uuid);
        assert_eq!(Uuid::from(id), uuid);
    }
}
