//! Ward Core - Foundation Types and Effect Interfaces
//!
//! This crate provides the foundational types shared by every ward crate:
//! identifiers, the unified error type, opaque reset tokens, configuration,
//! and the pure effect interfaces the recovery engine consumes.
//!
//! ## What Belongs Here
//!
//! - Identifier newtypes (`IdentityId`, `FactorId`, `ResetRequestId`, ...)
//! - The unified `WardError` and `Result` alias
//! - Single-use opaque capability tokens (`ResetToken`)
//! - Effect trait interfaces (clock, notifier, proofing oracle)
//! - Externally configured constants (policy threshold, waiting period)
//!
//! ## What Does NOT Belong Here
//!
//! - Effect handler implementations (belong in ward-effects)
//! - Domain state machines (belong in ward-reset / ward-enrollment)
//! - Policy decisions (belong in ward-factors)

#![forbid(unsafe_code)]

/// Identifier newtypes used across the platform
pub mod identifiers;

/// Unified error handling
pub mod errors;

/// Single-use opaque capability tokens
pub mod token;

/// Externally configured constants
pub mod config;

/// Pure effect interfaces (no implementations)
pub mod effects;

pub use config::{CountBasis, EnrollmentConfig, PolicyConfig, ResetConfig, TotpConfig, WardConfig};
pub use errors::{Result, WardError};
pub use identifiers::{EnrollmentId, FactorId, IdentityId, ResetRequestId, SessionId};
pub use token::ResetToken;
