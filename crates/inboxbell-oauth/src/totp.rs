//! Time-based one-time passwords (RFC 6238).
//!
//! Reddit accounts with two-factor authentication expect the current code
//! appended to the password as `password:123456` in the password grant.

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// Default code length.
const DEFAULT_DIGITS: u32 = 6;

/// Shortest code length RFC 4226 allows.
const MIN_DIGITS: u32 = 6;

/// Longest code length; `10^digits` must fit in a `u32`.
const MAX_DIGITS: u32 = 8;

/// Default time step in seconds.
const DEFAULT_STEP: u64 = 30;

/// TOTP generator for a shared secret.
#[derive(Clone)]
pub struct Totp {
    secret: Vec<u8>,
    digits: u32,
    step: u64,
}

impl std::fmt::Debug for Totp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Totp")
            .field("digits", &self.digits)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

impl Totp {
    /// Creates a generator from a base32 secret as shown by authenticator
    /// setup screens. Whitespace, padding and case are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty or not valid base32.
    pub fn from_base32(secret: &str) -> Result<Self> {
        let normalized: String = secret
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '=' && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.is_empty() {
            return Err(Error::InvalidTotpSecret("secret is empty".into()));
        }

        let secret = BASE32_NOPAD
            .decode(normalized.as_bytes())
            .map_err(|e| Error::InvalidTotpSecret(e.to_string()))?;

        Ok(Self::from_bytes(secret))
    }

    /// Creates a generator from raw secret bytes.
    #[must_use]
    pub const fn from_bytes(secret: Vec<u8>) -> Self {
        Self {
            secret,
            digits: DEFAULT_DIGITS,
            step: DEFAULT_STEP,
        }
    }

    /// Sets the number of digits in generated codes, clamped to 6..=8.
    #[must_use]
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits.clamp(MIN_DIGITS, MAX_DIGITS);
        self
    }

    /// Generates the code valid at the given Unix time.
    ///
    /// # Errors
    ///
    /// Returns an error if the HMAC cannot be keyed with the secret.
    pub fn generate(&self, unix_time: u64) -> Result<String> {
        let counter = unix_time / self.step;

        let mut mac = HmacSha1::new_from_slice(&self.secret)
            .map_err(|e| Error::InvalidTotpSecret(e.to_string()))?;
        mac.update(&counter.to_be_bytes());
        let hash = mac.finalize().into_bytes();

        // Dynamic truncation (RFC 4226 section 5.3)
        let offset = usize::from(hash[hash.len() - 1] & 0x0f);
        let binary = (u32::from(hash[offset]) & 0x7f) << 24
            | u32::from(hash[offset + 1]) << 16
            | u32::from(hash[offset + 2]) << 8
            | u32::from(hash[offset + 3]);

        let code = binary % 10_u32.pow(self.digits);
        Ok(format!("{code:0width$}", width = self.digits as usize))
    }

    /// Generates the code for the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the HMAC cannot be keyed with the secret.
    pub fn now(&self) -> Result<String> {
        let unix_time = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        self.generate(unix_time)
    }
}
