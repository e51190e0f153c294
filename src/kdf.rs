//! # Key Derivation
//!
//! PBKDF2-HMAC-SHA256 derivation of cipher key and IV from a password and
//! the per-stream salt, plus salt generation itself.
//!
//! Key and IV come out of a single derivation call: `key_len + block_len`
//! bytes are derived at once and split key-first. Deriving them separately
//! would produce identical key bytes with a different IV tail, so the split
//! is part of the stream format.

use crate::aliases::{HmacSha256, KeyMaterial, Password};
use crate::algorithm::Algorithm;
use crate::consts::{KDF_ITERATIONS, SALT_LEN};
use crate::error::BincryptError;

use pbkdf2::pbkdf2;
use rand::{rngs::OsRng, TryRngCore};
use zeroize::Zeroizing;

/// Derive `length` bytes of key material from a password and salt.
///
/// Runs PBKDF2-HMAC-SHA256 at the fixed stream iteration count. The output
/// is wrapped in [`KeyMaterial`] so it is zeroed when dropped.
#[inline(always)]
pub fn derive_key_material(
    password: &Password,
    salt: &[u8; SALT_LEN],
    length: usize,
) -> Result<KeyMaterial, BincryptError> {
    if length == 0 {
        return Err("derived length must be ≥1".into());
    }

    let mut out = Zeroizing::new(vec![0u8; length]);
    pbkdf2::<HmacSha256>(
        password.expose_secret().as_bytes(),
        salt,
        KDF_ITERATIONS,
        out.as_mut_slice(),
    )
    .map_err(|e| BincryptError::Crypto(format!("PBKDF2 failed: {e}")))?;

    Ok(out)
}

/// Derive the cipher key and IV for one stream.
///
/// Returns `(key, iv)` where the key is `algorithm.key_len()` bytes and the
/// IV is one cipher block.
pub(crate) fn derive_key_iv(
    password: &Password,
    salt: &[u8; SALT_LEN],
    algorithm: Algorithm,
) -> Result<(KeyMaterial, KeyMaterial), BincryptError> {
    let key_len = algorithm.key_len();
    let iv_len = algorithm.block_len();

    let material = derive_key_material(password, salt, key_len + iv_len)?;
    let key = Zeroizing::new(material[..key_len].to_vec());
    let iv = Zeroizing::new(material[key_len..].to_vec());
    Ok((key, iv))
}

/// Generate a fresh random salt from the operating system RNG.
pub(crate) fn generate_salt() -> Result<[u8; SALT_LEN], BincryptError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| BincryptError::Crypto(format!("salt generation failed: {e}")))?;
    Ok(salt)
}
