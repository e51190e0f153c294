//! # Block Cipher Transforms
//!
//! CBC encrypt/decrypt transforms over the supported block ciphers, plus
//! PKCS#7 trailer handling. The supported set is closed, so dispatch is a
//! plain enum rather than trait objects.

use crate::algorithm::Algorithm;
use crate::consts::MAX_BLOCK_LEN;
use crate::error::BincryptError;

use aes::cipher::block_padding::{Pkcs7, RawPadding};
use aes::cipher::{Block, BlockDecryptMut, BlockEncryptMut, InnerIvInit, InvalidLength, KeyInit};
use aes::{Aes256Dec, Aes256Enc};
use des::{Des, TdesEde3};
use rc2::Rc2;

/// RC2 effective key length in bits. Matches the 16-byte key the KDF
/// derives for [`Algorithm::Rc2`].
const RC2_EFFECTIVE_BITS: usize = 128;

fn bad_key(_: InvalidLength) -> BincryptError {
    "cipher key length mismatch".into()
}

fn bad_iv(_: InvalidLength) -> BincryptError {
    "cipher IV length mismatch".into()
}

/// Encrypt whole blocks in place, chaining through the mode state.
fn encrypt_in_place<M: BlockEncryptMut>(mode: &mut M, buf: &mut [u8]) {
    debug_assert_eq!(buf.len() % M::block_size(), 0);
    for chunk in buf.chunks_exact_mut(M::block_size()) {
        mode.encrypt_block_mut(Block::<M>::from_mut_slice(chunk));
    }
}

/// Decrypt whole blocks in place, chaining through the mode state.
fn decrypt_in_place<M: BlockDecryptMut>(mode: &mut M, buf: &mut [u8]) {
    debug_assert_eq!(buf.len() % M::block_size(), 0);
    for chunk in buf.chunks_exact_mut(M::block_size()) {
        mode.decrypt_block_mut(Block::<M>::from_mut_slice(chunk));
    }
}

/// Pad `tail` with PKCS#7 and encrypt it as the final block, consuming the
/// mode state. Returns the number of ciphertext bytes written to `out`.
fn encrypt_final<M: BlockEncryptMut>(
    mode: M,
    tail: &[u8],
    out: &mut [u8],
) -> Result<usize, BincryptError> {
    let ciphertext = mode
        .encrypt_padded_b2b_mut::<Pkcs7>(tail, out)
        .map_err(|_| BincryptError::from("final block exceeded output buffer"))?;
    Ok(ciphertext.len())
}

/// Validate and strip the PKCS#7 trailer from the final plaintext block.
///
/// # Errors
///
/// Returns [`BincryptError::PaddingInvalid`] when the trailer is malformed,
/// which is the usual symptom of decrypting with the wrong password or
/// algorithm.
pub(crate) fn strip_padding(block: &[u8]) -> Result<&[u8], BincryptError> {
    Pkcs7::raw_unpad(block).map_err(|_| BincryptError::PaddingInvalid)
}

/// Encrypting CBC transform for one stream.
///
/// `Rijndael` shares the `Aes` arm: identical key schedule, identical
/// transform.
pub(crate) enum CipherEncryptor {
    Aes(cbc::Encryptor<Aes256Enc>),
    Des(cbc::Encryptor<Des>),
    Rc2(cbc::Encryptor<Rc2>),
    TripleDes(cbc::Encryptor<TdesEde3>),
}

impl CipherEncryptor {
    pub(crate) fn new(
        algorithm: Algorithm,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self, BincryptError> {
        match algorithm {
            Algorithm::Aes | Algorithm::Rijndael => {
                let cipher = Aes256Enc::new_from_slice(key).map_err(bad_key)?;
                let mode = cbc::Encryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
                Ok(Self::Aes(mode))
            }
            Algorithm::Des => {
                let cipher = Des::new_from_slice(key).map_err(bad_key)?;
                let mode = cbc::Encryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
                Ok(Self::Des(mode))
            }
            Algorithm::Rc2 => {
                let cipher = Rc2::new_with_eff_key_len(key, RC2_EFFECTIVE_BITS);
                let mode = cbc::Encryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
                Ok(Self::Rc2(mode))
            }
            Algorithm::TripleDes => {
                let cipher = TdesEde3::new_from_slice(key).map_err(bad_key)?;
                let mode = cbc::Encryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
                Ok(Self::TripleDes(mode))
            }
        }
    }

    /// Encrypt `buf` in place. `buf` must be a whole number of blocks.
    pub(crate) fn encrypt_blocks(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes(mode) => encrypt_in_place(mode, buf),
            Self::Des(mode) => encrypt_in_place(mode, buf),
            Self::Rc2(mode) => encrypt_in_place(mode, buf),
            Self::TripleDes(mode) => encrypt_in_place(mode, buf),
        }
    }

    /// Pad and encrypt the final partial block, consuming the transform.
    /// `tail` must be shorter than one block; the written length is always
    /// exactly one block.
    pub(crate) fn finalize(
        self,
        tail: &[u8],
        out: &mut [u8; MAX_BLOCK_LEN],
    ) -> Result<usize, BincryptError> {
        match self {
            Self::Aes(mode) => encrypt_final(mode, tail, out),
            Self::Des(mode) => encrypt_final(mode, tail, &mut out[..8]),
            Self::Rc2(mode) => encrypt_final(mode, tail, &mut out[..8]),
            Self::TripleDes(mode) => encrypt_final(mode, tail, &mut out[..8]),
        }
    }
}

/// Decrypting CBC transform for one stream.
pub(crate) enum CipherDecryptor {
    Aes(cbc::Decryptor<Aes256Dec>),
    Des(cbc::Decryptor<Des>),
    Rc2(cbc::Decryptor<Rc2>),
    TripleDes(cbc::Decryptor<TdesEde3>),
}

impl CipherDecryptor {
    pub(crate) fn new(
        algorithm: Algorithm,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self, BincryptError> {
        match algorithm {
            Algorithm::Aes | Algorithm::Rijndael => {
                let cipher = Aes256Dec::new_from_slice(key).map_err(bad_key)?;
                let mode = cbc::Decryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
                Ok(Self::Aes(mode))
            }
            Algorithm::Des => {
                let cipher = Des::new_from_slice(key).map_err(bad_key)?;
                let mode = cbc::Decryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
                Ok(Self::Des(mode))
            }
            Algorithm::Rc2 => {
                let cipher = Rc2::new_with_eff_key_len(key, RC2_EFFECTIVE_BITS);
                let mode = cbc::Decryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
                Ok(Self::Rc2(mode))
            }
            Algorithm::TripleDes => {
                let cipher = TdesEde3::new_from_slice(key).map_err(bad_key)?;
                let mode = cbc::Decryptor::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?;
                Ok(Self::TripleDes(mode))
            }
        }
    }

    /// Decrypt `buf` in place. `buf` must be a whole number of blocks.
    pub(crate) fn decrypt_blocks(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes(mode) => decrypt_in_place(mode, buf),
            Self::Des(mode) => decrypt_in_place(mode, buf),
            Self::Rc2(mode) => decrypt_in_place(mode, buf),
            Self::TripleDes(mode) => decrypt_in_place(mode, buf),
        }
    }
}
