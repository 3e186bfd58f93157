//! Ward Testkit - Deterministic Effect Doubles
//!
//! Controllable implementations of the effect interfaces plus identity
//! fixtures, so lifecycle tests can freeze time, assert on notification
//! fan-out, and flip the proofing gate without touching production
//! handlers.

#![forbid(unsafe_code)]

/// Manually advanced clock
pub mod clock;

/// Notifier that records every dispatch
pub mod notifier;

/// Proofing oracles with fixed answers
pub mod proofing;

/// Identity and factor fixtures
pub mod fixtures;

pub use clock::ManualClock;
pub use fixtures::identity_with_factors;
pub use notifier::RecordingNotifier;
pub use proofing::{FailingProofingOracle, FixedProofingOracle};
