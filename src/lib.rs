// src/lib.rs

pub mod aliases;
pub mod algorithm;
mod cipher;
pub mod consts;
pub mod context;
pub mod error;
pub mod kdf;
pub mod reader;
mod utils;
pub mod value;
pub mod writer;

// High-level API: this is what 99% of users import
pub use algorithm::Algorithm;
pub use context::{decode_octets, encode_octets, Encryption};
pub use error::BincryptError;
pub use reader::DecryptReader;
pub use value::{Value, ValueKind};
pub use writer::EncryptWriter;

// Low-level pieces: public at the root for callers that derive raw key
// bytes themselves (interop checks against other implementations of the
// format) or validate passwords without opening a stream.
pub use aliases::Password;
pub use kdf::derive_key_material;
