//! Externally configured constants
//!
//! All thresholds and durations are read at startup and injected into the
//! services that use them. Nothing in here is consulted at runtime from
//! global state.

use crate::errors::{Result, WardError};
use serde::{Deserialize, Serialize};

/// Which factor count the minimum-diversity rule compares against
///
/// Whether the minimum applies to the count before or after the proposed
/// mutation varies by deployment, so the basis is explicit configuration
/// rather than a hard-coded interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CountBasis {
    /// Compare the enabled-factor count as it stands, mutation not applied
    #[default]
    BeforeMutation,
    /// Compare the enabled-factor count as it would be after the mutation
    AfterMutation,
}

/// Minimum-factor-diversity policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum number of enabled factors required to permit removal/disable
    pub min_factor_count: usize,
    /// Whether the minimum applies before or after the proposed mutation
    pub count_basis: CountBasis,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_factor_count: 3,
            count_basis: CountBasis::BeforeMutation,
        }
    }
}

/// Account-reset lifecycle knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Mandatory delay between request creation and grant eligibility
    pub waiting_period_secs: u64,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            // Calendar-time anti-abuse control: one full day
            waiting_period_secs: 24 * 60 * 60,
        }
    }
}

/// One-time-code parameters for authenticator-app factors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    /// Time step in seconds
    pub step_secs: u64,
    /// Code length in digits
    pub digits: u32,
    /// Accepted clock skew, in steps on either side
    pub skew_steps: u64,
    /// Shared-secret length in bytes
    pub secret_len: usize,
    /// Issuer label for provisioning URIs
    pub issuer: String,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            step_secs: 30,
            digits: 6,
            skew_steps: 1,
            secret_len: 20,
            issuer: "ward".to_string(),
        }
    }
}

/// Factor-enrollment session knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentConfig {
    /// How long an unconfirmed candidate stays usable
    pub candidate_ttl_secs: u64,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            candidate_ttl_secs: 15 * 60,
        }
    }
}

/// Aggregate configuration loaded once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardConfig {
    /// Minimum-factor-diversity policy
    pub policy: PolicyConfig,
    /// Account-reset lifecycle
    pub reset: ResetConfig,
    /// One-time-code parameters
    pub totp: TotpConfig,
    /// Factor-enrollment sessions
    pub enrollment: EnrollmentConfig,
}

impl WardConfig {
    /// Parse configuration from TOML, filling omitted sections with defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| WardError::internal(format!("bad configuration: {e}")))
    }
}
