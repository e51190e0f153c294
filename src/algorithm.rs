//! # Cipher Algorithm Selection
//!
//! The closed set of block ciphers a stream can be produced with, plus the
//! key and block geometry the KDF and transforms are sized from.

use crate::error::BincryptError;
use std::fmt;
use std::str::FromStr;

/// Block cipher used for a stream.
///
/// The algorithm is not recorded in the stream itself; the reading side must
/// be constructed with the same variant that produced the stream, exactly as
/// it must be given the same password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-256 in CBC mode, 16-byte blocks.
    Aes,
    /// Single DES, 8-byte key and blocks. Kept for compatibility with
    /// existing streams; do not pick it for new data.
    Des,
    /// RC2 with a 16-byte key and 128-bit effective key length, 8-byte
    /// blocks. Compatibility only.
    Rc2,
    /// Alias of [`Algorithm::Aes`]: same key and block geometry, same
    /// transform. Streams written as `Rijndael` decrypt as `Aes` and vice
    /// versa.
    Rijndael,
    /// Triple DES (EDE, three independent 8-byte keys), 8-byte blocks.
    TripleDes,
}

impl Algorithm {
    /// All supported algorithms, in declaration order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Aes,
        Algorithm::Des,
        Algorithm::Rc2,
        Algorithm::Rijndael,
        Algorithm::TripleDes,
    ];

    /// Cipher key length in bytes. The KDF derives exactly this much key
    /// material, followed by one block of IV.
    #[inline(always)]
    pub const fn key_len(self) -> usize {
        match self {
            Algorithm::Aes | Algorithm::Rijndael => 32,
            Algorithm::Des => 8,
            Algorithm::Rc2 => 16,
            Algorithm::TripleDes => 24,
        }
    }

    /// Cipher block length in bytes. Also the IV length, and the unit the
    /// stream transform pads to.
    #[inline(always)]
    pub const fn block_len(self) -> usize {
        match self {
            Algorithm::Aes | Algorithm::Rijndael => 16,
            Algorithm::Des | Algorithm::Rc2 | Algorithm::TripleDes => 8,
        }
    }

    /// Canonical lowercase name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Aes => "aes",
            Algorithm::Des => "des",
            Algorithm::Rc2 => "rc2",
            Algorithm::Rijndael => "rijndael",
            Algorithm::TripleDes => "tripledes",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = BincryptError;

    /// Parse a case-insensitive algorithm name. `"3des"` is accepted as a
    /// spelling of `"tripledes"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes" => Ok(Algorithm::Aes),
            "des" => Ok(Algorithm::Des),
            "rc2" => Ok(Algorithm::Rc2),
            "rijndael" => Ok(Algorithm::Rijndael),
            "tripledes" | "3des" => Ok(Algorithm::TripleDes),
            other => Err(BincryptError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_and_block_geometry() {
        assert_eq!(Algorithm::Aes.key_len(), 32);
        assert_eq!(Algorithm::Aes.block_len(), 16);
        assert_eq!(Algorithm::Des.key_len(), 8);
        assert_eq!(Algorithm::Des.block_len(), 8);
        assert_eq!(Algorithm::Rc2.key_len(), 16);
        assert_eq!(Algorithm::Rc2.block_len(), 8);
        assert_eq!(Algorithm::Rijndael.key_len(), 32);
        assert_eq!(Algorithm::Rijndael.block_len(), 16);
        assert_eq!(Algorithm::TripleDes.key_len(), 24);
        assert_eq!(Algorithm::TripleDes.block_len(), 8);
    }

    #[test]
    fn names_round_trip() {
        for alg in Algorithm::ALL {
            let parsed: Algorithm = alg.name().parse().unwrap();
            assert_eq!(parsed, alg);
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("AES".parse::<Algorithm>().unwrap(), Algorithm::Aes);
        assert_eq!("TripleDES".parse::<Algorithm>().unwrap(), Algorithm::TripleDes);
        assert_eq!("3DES".parse::<Algorithm>().unwrap(), Algorithm::TripleDes);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "blowfish".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, BincryptError::UnsupportedAlgorithm(name) if name == "blowfish"));
    }
}
