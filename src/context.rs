//! # Encryption Context
//!
//! [`Encryption`] binds a validated password to a cipher algorithm and is
//! the entry point for everything else: stream sessions over arbitrary
//! sinks and sources, file sessions, and the base64 single-value facade.
//!
//! The context is cheap to clone and holds no per-stream state; every
//! session it opens gets its own salt, derived key and transform, so one
//! context can serve any number of concurrent sessions.

use crate::algorithm::Algorithm;
use crate::aliases::Password;
use crate::error::BincryptError;
use crate::reader::DecryptReader;
use crate::value::{Value, ValueKind};
use crate::writer::EncryptWriter;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

/// Encode bytes as standard base64 with padding.
pub fn encode_octets(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 text back into bytes.
///
/// # Errors
///
/// Returns [`BincryptError::InvalidEncoding`] when `encoded` is not valid
/// base64.
pub fn decode_octets(encoded: &str) -> Result<Vec<u8>, BincryptError> {
    Ok(STANDARD.decode(encoded)?)
}

/// A password bound to a cipher algorithm.
#[derive(Clone)]
pub struct Encryption {
    password: Password,
    algorithm: Algorithm,
}

impl Encryption {
    /// Build a context from a raw password and algorithm.
    ///
    /// The password is trimmed of surrounding whitespace before use; the
    /// trimmed form is what feeds key derivation, so `" pw "` and `"pw"`
    /// decrypt each other's streams.
    ///
    /// # Errors
    ///
    /// Returns [`BincryptError::InvalidPassword`] if the password trims to
    /// the empty string.
    pub fn new(password: &str, algorithm: Algorithm) -> Result<Self, BincryptError> {
        Ok(Self {
            password: Password::new(password)?,
            algorithm,
        })
    }

    /// The algorithm this context encrypts and decrypts with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Open an encrypting session over `sink`. Writes the salt prefix
    /// immediately.
    pub fn open_writer<W: Write>(&self, sink: W) -> Result<EncryptWriter<W>, BincryptError> {
        EncryptWriter::new(self.algorithm, &self.password, sink)
    }

    /// Open a decrypting session over `source`. Consumes the salt prefix
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`BincryptError::TruncatedStream`] when `source` holds fewer
    /// than 8 bytes.
    pub fn open_reader<R: Read>(&self, source: R) -> Result<DecryptReader<R>, BincryptError> {
        DecryptReader::new(self.algorithm, &self.password, source)
    }

    /// Create (or truncate) a file and open an encrypting session over it.
    pub fn create<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<EncryptWriter<BufWriter<File>>, BincryptError> {
        let file = File::create(path)?;
        self.open_writer(BufWriter::new(file))
    }

    /// Open an existing file for a decrypting session.
    pub fn open<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<DecryptReader<BufReader<File>>, BincryptError> {
        let file = File::open(path)?;
        self.open_reader(BufReader::new(file))
    }

    /// Encrypt a single value into a base64 string.
    ///
    /// The string wraps a complete one-value stream: salt prefix, the
    /// value's frame, final padding block. Salts are fresh per call, so
    /// encrypting the same value twice yields different strings.
    pub fn encrypt_value(&self, value: &Value) -> Result<String, BincryptError> {
        let mut writer = self.open_writer(Vec::new())?;
        writer.write_value(value)?;
        let ciphertext = writer.finish()?;
        Ok(encode_octets(&ciphertext))
    }

    /// Decrypt a base64 string produced by [`encrypt_value`](Self::encrypt_value)
    /// back into a value of the given kind.
    ///
    /// # Errors
    ///
    /// A wrong password or algorithm surfaces as
    /// [`BincryptError::PaddingInvalid`] with overwhelming probability;
    /// malformed base64 as [`BincryptError::InvalidEncoding`].
    pub fn decrypt_value(&self, encoded: &str, kind: ValueKind) -> Result<Value, BincryptError> {
        let ciphertext = decode_octets(encoded)?;
        let mut reader = self.open_reader(Cursor::new(ciphertext))?;
        reader.read_value(kind)
    }
}

impl fmt::Debug for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encryption")
            .field("algorithm", &self.algorithm)
            .field("password", &self.password)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_reports_its_algorithm() {
        let ctx = Encryption::new("pw", Algorithm::TripleDes).unwrap();
        assert_eq!(ctx.algorithm(), Algorithm::TripleDes);
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(
            Encryption::new("   ", Algorithm::Aes),
            Err(BincryptError::InvalidPassword)
        ));
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let ctx = Encryption::new("Password123", Algorithm::Aes).unwrap();
        let shown = format!("{ctx:?}");
        assert!(shown.contains("Aes"));
        assert!(!shown.contains("Password123"));
    }

    #[test]
    fn octets_round_trip_through_base64() {
        let bytes = [0u8, 1, 2, 253, 254, 255];
        let encoded = encode_octets(&bytes);
        assert_eq!(decode_octets(&encoded).unwrap(), bytes);
    }

    #[test]
    fn garbage_base64_is_rejected() {
        assert!(matches!(
            decode_octets("not!!valid@@base64"),
            Err(BincryptError::InvalidEncoding(_))
        ));
    }
}
