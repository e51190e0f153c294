//! tests/common.rs
//! Common constants and utilities shared across test files

use bincrypt::{Algorithm, Encryption};

/// Standard test password, also used in the documentation examples.
#[allow(dead_code)] // Used across multiple test files
pub const TEST_PASSWORD: &str = "Password123";

/// A context over the standard test password.
#[allow(dead_code)] // Used across multiple test files
pub fn context(algorithm: Algorithm) -> Encryption {
    Encryption::new(TEST_PASSWORD, algorithm)
        .unwrap_or_else(|e| panic!("Failed to build context for {algorithm}: {e:?}"))
}
