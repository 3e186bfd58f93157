//! Unified error system for ward
//!
//! One error type covers every operation in the recovery engine. All
//! variants are recoverable values returned to the caller; only `Internal`
//! marks an invariant violation that should be logged as a defect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unified error type for all ward operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum WardError {
    /// Capability token absent, mismatched, or already consumed
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// What the token failed against
        message: String,
    },

    /// Grant requested before the waiting period elapsed
    #[error("Too early: grant becomes available at epoch {ready_at}")]
    TooEarly {
        /// Epoch second at which the waiting period elapses
        ready_at: u64,
    },

    /// Operation not valid in the request's current state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Which transition was refused and why
        message: String,
    },

    /// Factor removal/disable would breach the minimum-diversity rule
    #[error("Policy violation: {}", summarize(.violations))]
    PolicyViolation {
        /// Field-keyed violation messages
        violations: BTreeMap<String, Vec<String>>,
        /// Enabled factor counts per kind at decision time, for auditing
        counts_by_kind: BTreeMap<String, usize>,
    },

    /// Enrollment confirmation code incorrect; the candidate survives
    #[error("Invalid code")]
    InvalidCode,

    /// Enrollment candidate expired before confirmation
    #[error("Enrollment candidate expired")]
    CandidateExpired,

    /// Identity already at the assurance level that forbids self-service reset
    #[error("Proofing gate blocked: {message}")]
    ProofingGateBlocked {
        /// Why the gate refused
        message: String,
    },

    /// Entity not found
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// Storage layer error during an atomic transition; transient, retryable
    #[error("Persistence failure: {message}")]
    Persistence {
        /// Error message from the storage layer
        message: String,
    },

    /// Invariant violation; a defect, not control flow
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },
}

fn summarize(violations: &BTreeMap<String, Vec<String>>) -> String {
    violations
        .values()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join("; ")
}

impl WardError {
    /// Create an invalid token error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a proofing gate error
    pub fn proofing_gate_blocked(message: impl Into<String>) -> Self {
        Self::ProofingGateBlocked {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a persistence error for a lost optimistic-version race
    pub fn version_conflict(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: format!("version conflict: {}", message.into()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the operation unchanged
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

/// Standard Result type for ward operations
pub type Result<T> = std::result::Result<T, WardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_violation_display_lists_messages() {
        let mut violations = BTreeMap::new();
        violations.insert(
            "identity".to_string(),
            vec!["must have 3 or more enabled factors".to_string()],
        );
        let err = WardError::PolicyViolation {
            violations,
            counts_by_kind: BTreeMap::new(),
        };
        assert_eq!(
            err.to_string(),
            "Policy violation: must have 3 or more enabled factors"
        );
    }

    #[test]
    fn only_persistence_is_transient() {
        assert!(WardError::persistence("timeout").is_transient());
        assert!(!WardError::invalid_token("no match").is_transient());
        assert!(!WardError::InvalidCode.is_transient());
    }
}
