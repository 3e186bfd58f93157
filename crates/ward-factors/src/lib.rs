//! Ward Factors - Second-Factor Model and Diversity Policy
//!
//! This crate owns the factor data model and every decision about factor
//! mutations:
//!
//! - The closed set of factor kinds (phone, authenticator app, security
//!   key, smart card, personal key) and the `FactorSet` collection
//! - The `Identity` aggregate the rest of the engine reads and mutates
//! - `FactorPolicyEngine`: the pure minimum-diversity decision function
//! - RFC 6238 one-time-code verification for authenticator-app factors
//!
//! The policy engine never mutates anything; callers that pass its check
//! apply the mutation through the `IdentityStore` effect trait.

#![forbid(unsafe_code)]

/// Factor kinds and the factor collection
pub mod factor;

/// The identity aggregate
pub mod identity;

/// Minimum-factor-diversity policy engine
pub mod policy;

/// RFC 6238 one-time codes for authenticator-app factors
pub mod totp;

/// Identity persistence effect trait
pub mod store;

pub use factor::{Factor, FactorKind, FactorSet};
pub use identity::Identity;
pub use policy::{FactorPolicyEngine, PolicyDecision};
pub use store::IdentityStore;
pub use totp::TotpSecret;
