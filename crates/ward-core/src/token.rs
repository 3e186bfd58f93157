//! Single-use opaque capability tokens
//!
//! Reset tokens carry no embedded semantics: 32 bytes of CSPRNG output,
//! URL-safe base64 without padding, compared in constant time. A token is
//! owned by exactly one reset request and is cleared the instant it is
//! consumed or the request is cancelled.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Raw entropy per token, before encoding
pub const TOKEN_BYTES: usize = 32;

/// Encoded token length: ceil(32 * 8 / 6) base64 characters, unpadded
pub const TOKEN_LEN: usize = 43;

/// Opaque single-use capability token
///
/// `Debug` is redacted so tokens never leak through logs. Comparison goes
/// through [`ResetToken::matches`]; the type deliberately does not
/// implement `PartialEq` against strings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ResetToken(String);

impl ResetToken {
    /// Generate a fresh token from operating-system randomness
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Constant-time comparison against a candidate string
    ///
    /// A length mismatch still performs a full-width comparison over the
    /// stored value so timing does not reveal how much of a prefix matched.
    pub fn matches(&self, candidate: &str) -> bool {
        let stored = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        if stored.len() != candidate.len() {
            let _ = stored.ct_eq(stored);
            return false;
        }
        stored.ct_eq(candidate).into()
    }

    /// The encoded token value, for embedding in a notification payload
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetToken(redacted)")
    }
}

/// Compare a candidate against an optional stored token
///
/// Absence always compares false; a consumed or never-issued token can
/// never validate.
pub fn matches_opt(candidate: &str, stored: Option<&ResetToken>) -> bool {
    match stored {
        Some(token) => token.matches(candidate),
        None => false,
    }
}
