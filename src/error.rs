//! # Error Types
//!
//! This module defines the error types used throughout the library.
//! All operations return [`Result<T, BincryptError>`](BincryptError) for comprehensive error handling.

use thiserror::Error;

/// The error type for all bincrypt operations.
///
/// This enum covers I/O errors, cryptographic errors, malformed frames,
/// and text-encoding issues on the single-value facade.
#[derive(Error, Debug)]
pub enum BincryptError {
    /// I/O error occurred on the underlying stream.
    ///
    /// This variant wraps [`std::io::Error`] and is automatically created
    /// when sink or source operations fail (e.g., file not found, write
    /// errors, broken pipes).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cryptographic operation failed.
    ///
    /// This variant is used for errors in cryptographic machinery such as:
    /// - KDF derivation failures
    /// - Salt generation failures
    /// - Cipher construction with mismatched key or IV lengths
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// The password is empty or consists only of whitespace.
    ///
    /// Passwords are trimmed before key derivation; a password that trims
    /// to nothing is rejected up front rather than producing a context that
    /// can never decrypt anything meaningful.
    #[error("Password must not be empty or whitespace-only")]
    InvalidPassword,

    /// The named cipher algorithm is not one of the supported set.
    ///
    /// The contained value is the unrecognized name.
    #[error("Unsupported algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    /// The named value kind is not one of the supported set.
    ///
    /// The contained value is the unrecognized name.
    #[error("Unsupported value type: {0:?}")]
    UnsupportedType(String),

    /// The stream ended before a complete unit could be read.
    ///
    /// Covers a missing or short salt prefix, ciphertext that is not a
    /// whole number of blocks, and value frames that extend past the end
    /// of the decrypted plaintext.
    #[error("Truncated stream: {0}")]
    TruncatedStream(&'static str),

    /// Final-block padding failed validation.
    ///
    /// This is the usual symptom of a wrong password or wrong algorithm:
    /// the stream decrypts to garbage and the PKCS#7 trailer check fails.
    /// It can also indicate ciphertext corruption.
    #[error("Invalid final-block padding (wrong password, wrong algorithm, or corrupt data)")]
    PaddingInvalid,

    /// A decrypted value frame is structurally invalid.
    ///
    /// Covers negative or oversized length prefixes, malformed varints,
    /// byte sequences that are not valid UTF-8 where text is required, and
    /// out-of-range timestamps.
    #[error("Invalid value frame: {0}")]
    InvalidFrame(String),

    /// The single-value facade was handed text that is not valid base64.
    #[error("Invalid base64 encoding: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// A write or close was attempted on an already-closed session.
    #[error("Stream session is closed")]
    SessionClosed,
}

impl From<&'static str> for BincryptError {
    fn from(msg: &'static str) -> Self {
        BincryptError::Crypto(msg.to_string())
    }
}
