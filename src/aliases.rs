//! # Secret Type Aliases
//!
//! This module provides the secret-carrying types used across the library,
//! backed by [`zeroize`](https://docs.rs/zeroize) so that passwords and derived
//! key material are wiped from memory on drop.
//!
//! ## Type Categories
//!
//! ### HMAC Primitives
//! - [`HmacSha256`] - HMAC-SHA256, the PBKDF2 pseudo-random function
//!
//! ### Dynamic Secrets
//! - [`Password`] - Trimmed, validated password wrapper
//! - [`KeyMaterial`] - Derived key and IV bytes
//!
//! ## Usage
//!
//! [`Password`] requires an explicit `.expose_secret()` to access the
//! underlying string, and redacts itself in `Debug` output.

use crate::error::BincryptError;
use hmac::Hmac;
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroizing;

// ─────────────────────────────────────────────────────────────────────────────
// HMAC primitives, available via `aliases::*`
// ─────────────────────────────────────────────────────────────────────────────
pub type HmacSha256 = Hmac<Sha256>;

// ─────────────────────────────────────────────────────────────────────────────
// Derived secrets
// ─────────────────────────────────────────────────────────────────────────────

/// Key or IV bytes produced by the KDF. Zeroed on drop.
pub type KeyMaterial = Zeroizing<Vec<u8>>;

// ─────────────────────────────────────────────────────────────────────────────
// Dynamic secrets
// ─────────────────────────────────────────────────────────────────────────────

/// A validated encryption password.
///
/// Construction trims leading and trailing whitespace and rejects anything
/// that trims to the empty string. The stored string is zeroed on drop.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Trim and validate a raw password.
    ///
    /// # Errors
    ///
    /// Returns [`BincryptError::InvalidPassword`] if `raw` is empty or
    /// whitespace-only.
    pub fn new(raw: &str) -> Result<Self, BincryptError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BincryptError::InvalidPassword);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Access the trimmed password text.
    #[inline(always)]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}
