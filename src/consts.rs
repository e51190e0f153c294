//! # Constants
//!
//! This module defines constants used throughout the library for salt geometry,
//! PBKDF2 iteration counts, and buffer sizing.

/// Salt prefix length in bytes.
///
/// Every stream starts with exactly this many bytes of random salt, written
/// before any ciphertext. Decryption reads the same prefix back before the
/// first block.
pub const SALT_LEN: usize = 8;

/// PBKDF2 iteration count used for key derivation.
///
/// Fixed by the stream format: both sides must run the same count or the
/// derived key and IV will not match and decryption fails at the padding
/// check.
pub const KDF_ITERATIONS: u32 = 1_000;

/// Largest block length of any supported cipher.
///
/// AES and Rijndael use 16-byte blocks; DES, RC2 and Triple DES use 8.
/// Stack buffers for final-block handling are sized to this.
pub const MAX_BLOCK_LEN: usize = 16;

/// Ciphertext read granularity for decrypting sessions.
pub const READ_CHUNK_LEN: usize = 4 * 1024;

/// Incremental allocation step when filling length-prefixed frames.
///
/// A corrupt length prefix can claim up to `i32::MAX` bytes; growing the
/// destination in steps of this size lets truncation surface before the
/// claimed length is ever allocated.
pub const FRAME_FILL_CHUNK: usize = 64 * 1024;
