//! RFC 6238 one-time codes for authenticator-app factors
//!
//! HMAC-SHA1 with dynamic truncation, a configurable step and digit
//! count, and a skew window for clock drift. Verification compares codes
//! in constant time. Secrets are wiped from memory on drop.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::fmt;
use subtle::ConstantTimeEq;
use ward_core::TotpConfig;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha1 = Hmac<Sha1>;

/// Shared secret for an authenticator-app factor
///
/// `Debug` is redacted and the bytes are zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TotpSecret(Vec<u8>);

impl TotpSecret {
    /// Generate a fresh secret from operating-system randomness
    pub fn generate(len: usize) -> Self {
        use rand::RngCore;
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing secret bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw secret bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// RFC 4648 base32 without padding, the authenticator-app wire form
    pub fn base32(&self) -> String {
        base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &self.0)
    }
}

impl fmt::Debug for TotpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TotpSecret(redacted)")
    }
}

/// Code for the step containing `epoch_secs`
pub fn code_at(secret: &TotpSecret, epoch_secs: u64, config: &TotpConfig) -> String {
    hotp(secret.as_bytes(), epoch_secs / config.step_secs, config.digits)
}

/// Verify a submitted code against the secret at `now`
///
/// Accepts codes from `skew_steps` steps on either side of the current
/// step. Input is normalized by stripping spaces and dashes. Comparison is
/// constant-time per candidate step.
pub fn verify(secret: &TotpSecret, submitted: &str, now: u64, config: &TotpConfig) -> bool {
    let normalized = submitted.replace([' ', '-'], "");
    if normalized.len() != config.digits as usize {
        return false;
    }

    let current = (now / config.step_secs) as i64;
    let skew = config.skew_steps as i64;
    let mut matched = false;
    for offset in -skew..=skew {
        let Some(counter) = current.checked_add(offset).filter(|c| *c >= 0) else {
            continue;
        };
        let expected = hotp(secret.as_bytes(), counter as u64, config.digits);
        // fold with |= so every window step costs the same
        matched |= bool::from(expected.as_bytes().ct_eq(normalized.as_bytes()));
    }
    matched
}

/// `otpauth://` provisioning URI for QR rendering by the caller
pub fn provisioning_uri(secret: &TotpSecret, account: &str, config: &TotpConfig) -> String {
    format!(
        "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&algorithm=SHA1&digits={digits}&period={period}",
        issuer = urlencoding::encode(&config.issuer),
        account = urlencoding::encode(account),
        secret = secret.base32(),
        digits = config.digits,
        period = config.step_secs,
    )
}

fn hotp(secret: &[u8], counter: u64, digits: u32) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // RFC 4226 dynamic truncation
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let slice: [u8; 4] = digest[offset..offset + 4]
        .try_into()
        .expect("digest is 20 bytes, offset at most 15");
    let value = u32::from_be_bytes(slice) & 0x7fff_ffff;
    let code = value % 10u32.pow(digits);
    format!("{code:0width$}", width = digits as usize)
}
