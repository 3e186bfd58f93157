//! Ward Enrollment - Candidate-Credential Negotiation
//!
//! Adding an authenticator-app factor is a short-lived negotiation: the
//! engine issues a shared secret, the user scans it and proves possession
//! with a one-time code, and only then does the candidate become a
//! permanent factor. Until confirmation the candidate is not a factor and
//! is invisible to the diversity policy.
//!
//! Session states, per (session, identity) pair:
//!
//! ```text
//! Empty --begin--> SecretIssued --confirm(ok)--> Committed
//!                      |  ^
//!        confirm(bad)  |  | retry with the returned candidate
//!                      +--+
//! ```
//!
//! `Empty` is the absence of a candidate; expiry and `abandon` return to
//! it. Candidate state is an explicit caller-owned value passed into and
//! out of every operation, never ambient session storage, so a secret
//! can never leak across sessions. Factor revocation (`Disabled`) goes
//! through the same service because it must consult the policy engine
//! before mutating anything.

#![forbid(unsafe_code)]

/// The transient enrollment candidate
pub mod candidate;

/// The enrollment session operations
pub mod session;

pub use candidate::EnrollmentCandidate;
pub use session::{ConfirmOutcome, FactorEnrollmentSession};
