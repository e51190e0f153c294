//! # Encrypting Stream Writer
//!
//! A writing session over any [`Write`] sink. The writer emits the random
//! salt prefix up front, stages typed value frames as plaintext, encrypts
//! and forwards every whole cipher block as soon as it is available, and on
//! close pads the remaining tail with PKCS#7 and writes the final block.
//!
//! Values are framed little-endian; see the per-method documentation for
//! each frame shape. The stream carries no kind tags, so the reading side
//! must issue the matching `read_*` calls in the same order.

use crate::algorithm::Algorithm;
use crate::aliases::Password;
use crate::cipher::CipherEncryptor;
use crate::consts::MAX_BLOCK_LEN;
use crate::error::BincryptError;
use crate::kdf;
use crate::utils::wipe_buffer;
use crate::value::Value;

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::io::Write;

/// Encrypting session over a byte sink.
///
/// Closing is explicit via [`finish`](Self::finish) or
/// [`try_finish`](Self::try_finish); dropping an unclosed writer finalizes
/// it on a best-effort basis, discarding any error. Prefer the explicit
/// calls so a failed final write is observable.
///
/// A failed sink write closes the session: the cipher chain has advanced
/// past bytes the sink never took, so the stream cannot be resumed. The
/// staged buffer is wiped and every later write fails with
/// [`BincryptError::SessionClosed`].
pub struct EncryptWriter<W: Write> {
    sink: Option<W>,
    encryptor: Option<CipherEncryptor>,
    /// Plaintext staging area. Whole blocks are encrypted in place and
    /// forwarded; at most one partial block of plaintext remains here
    /// between writes.
    buf: Vec<u8>,
    block_len: usize,
    closed: bool,
}

impl<W: Write> EncryptWriter<W> {
    /// Open a session: generate a salt, derive the key and IV, and write
    /// the salt prefix to `sink`.
    pub(crate) fn new(
        algorithm: Algorithm,
        password: &Password,
        mut sink: W,
    ) -> Result<Self, BincryptError> {
        let salt = kdf::generate_salt()?;
        let (key, iv) = kdf::derive_key_iv(password, &salt, algorithm)?;
        let encryptor = CipherEncryptor::new(algorithm, &key, &iv)?;

        // Nothing is written until the cipher is known to be usable.
        sink.write_all(&salt)?;

        Ok(Self {
            sink: Some(sink),
            encryptor: Some(encryptor),
            buf: Vec::new(),
            block_len: algorithm.block_len(),
            closed: false,
        })
    }

    /// Stage plaintext, encrypting and forwarding every whole block.
    fn write_plain(&mut self, bytes: &[u8]) -> Result<(), BincryptError> {
        if self.closed {
            return Err(BincryptError::SessionClosed);
        }
        self.buf.extend_from_slice(bytes);

        let full = self.buf.len() - self.buf.len() % self.block_len;
        if full > 0 {
            let encryptor = self
                .encryptor
                .as_mut()
                .expect("transform present while open");
            encryptor.encrypt_blocks(&mut self.buf[..full]);

            let sink = self.sink.as_mut().expect("sink present while open");
            if let Err(e) = sink.write_all(&self.buf[..full]) {
                // The chain state covers bytes the sink never took; nothing
                // appended past this point could decrypt.
                self.closed = true;
                self.encryptor = None;
                wipe_buffer(&mut self.buf);
                return Err(e.into());
            }
            self.buf.drain(..full);
        }
        Ok(())
    }

    /// Write a `bool` as one byte, `0` or `1`.
    pub fn write_bool(&mut self, value: bool) -> Result<(), BincryptError> {
        self.write_plain(&[u8::from(value)])
    }

    /// Write an `i8` as one byte.
    pub fn write_i8(&mut self, value: i8) -> Result<(), BincryptError> {
        self.write_plain(&[value as u8])
    }

    /// Write a `u8` as one byte.
    pub fn write_u8(&mut self, value: u8) -> Result<(), BincryptError> {
        self.write_plain(&[value])
    }

    /// Write an `i16` as 2 little-endian bytes.
    pub fn write_i16(&mut self, value: i16) -> Result<(), BincryptError> {
        let mut buf = [0u8; 2];
        LittleEndian::write_i16(&mut buf, value);
        self.write_plain(&buf)
    }

    /// Write a `u16` as 2 little-endian bytes.
    pub fn write_u16(&mut self, value: u16) -> Result<(), BincryptError> {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, value);
        self.write_plain(&buf)
    }

    /// Write an `i32` as 4 little-endian bytes.
    pub fn write_i32(&mut self, value: i32) -> Result<(), BincryptError> {
        let mut buf = [0u8; 4];
        LittleEndian::write_i32(&mut buf, value);
        self.write_plain(&buf)
    }

    /// Write a `u32` as 4 little-endian bytes.
    pub fn write_u32(&mut self, value: u32) -> Result<(), BincryptError> {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.write_plain(&buf)
    }

    /// Write an `i64` as 8 little-endian bytes.
    pub fn write_i64(&mut self, value: i64) -> Result<(), BincryptError> {
        let mut buf = [0u8; 8];
        LittleEndian::write_i64(&mut buf, value);
        self.write_plain(&buf)
    }

    /// Write a `u64` as 8 little-endian bytes.
    pub fn write_u64(&mut self, value: u64) -> Result<(), BincryptError> {
        let mut buf = [0u8; 8];
        LittleEndian::write_u64(&mut buf, value);
        self.write_plain(&buf)
    }

    /// Write an `f32` as its IEEE-754 bit pattern, 4 little-endian bytes.
    pub fn write_f32(&mut self, value: f32) -> Result<(), BincryptError> {
        let mut buf = [0u8; 4];
        LittleEndian::write_f32(&mut buf, value);
        self.write_plain(&buf)
    }

    /// Write an `f64` as its IEEE-754 bit pattern, 8 little-endian bytes.
    pub fn write_f64(&mut self, value: f64) -> Result<(), BincryptError> {
        let mut buf = [0u8; 8];
        LittleEndian::write_f64(&mut buf, value);
        self.write_plain(&buf)
    }

    /// Write a [`Decimal`] in its 16-byte portable representation
    /// (lo/mid/hi mantissa words plus scale and sign flags).
    pub fn write_decimal(&mut self, value: Decimal) -> Result<(), BincryptError> {
        self.write_plain(&value.serialize())
    }

    /// Write a `char` as its UTF-8 encoding, 1 to 4 bytes. The reader
    /// recovers the width from the first byte.
    pub fn write_char(&mut self, value: char) -> Result<(), BincryptError> {
        let mut buf = [0u8; 4];
        let encoded = value.encode_utf8(&mut buf);
        self.write_plain(encoded.as_bytes())
    }

    /// Write a UTC timestamp as microseconds since the Unix epoch, 8
    /// little-endian bytes. Sub-microsecond precision is truncated.
    pub fn write_timestamp(&mut self, value: DateTime<Utc>) -> Result<(), BincryptError> {
        self.write_i64(value.timestamp_micros())
    }

    /// Write a string frame: a varint (LEB128) byte length followed by the
    /// UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BincryptError::InvalidFrame`] when the encoded length
    /// exceeds `i32::MAX` bytes, the format's frame limit.
    pub fn write_str(&mut self, value: &str) -> Result<(), BincryptError> {
        let bytes = value.as_bytes();
        if bytes.len() > i32::MAX as usize {
            return Err(BincryptError::InvalidFrame(
                "string exceeds the frame length limit".into(),
            ));
        }

        let mut prefix_buf = unsigned_varint::encode::u32_buffer();
        let prefix = unsigned_varint::encode::u32(bytes.len() as u32, &mut prefix_buf);
        self.write_plain(prefix)?;
        self.write_plain(bytes)
    }

    /// Write a byte-array frame: a 4-byte little-endian length followed by
    /// the raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BincryptError::InvalidFrame`] when the length exceeds
    /// `i32::MAX` bytes.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), BincryptError> {
        if value.len() > i32::MAX as usize {
            return Err(BincryptError::InvalidFrame(
                "byte array exceeds the frame length limit".into(),
            ));
        }
        let mut buf = [0u8; 4];
        LittleEndian::write_i32(&mut buf, value.len() as i32);
        self.write_plain(&buf)?;
        self.write_plain(value)
    }

    /// Write a string-array frame: a 4-byte little-endian element count
    /// followed by one string frame per element.
    ///
    /// # Errors
    ///
    /// Returns [`BincryptError::InvalidFrame`] when the element count
    /// exceeds `i32::MAX`.
    pub fn write_str_array<S: AsRef<str>>(&mut self, values: &[S]) -> Result<(), BincryptError> {
        if values.len() > i32::MAX as usize {
            return Err(BincryptError::InvalidFrame(
                "string array exceeds the frame element limit".into(),
            ));
        }
        let mut buf = [0u8; 4];
        LittleEndian::write_i32(&mut buf, values.len() as i32);
        self.write_plain(&buf)?;
        for value in values {
            self.write_str(value.as_ref())?;
        }
        Ok(())
    }

    /// Write a dynamically-typed [`Value`], dispatching to the matching
    /// typed method.
    pub fn write_value(&mut self, value: &Value) -> Result<(), BincryptError> {
        match value {
            Value::Bool(v) => self.write_bool(*v),
            Value::I8(v) => self.write_i8(*v),
            Value::U8(v) => self.write_u8(*v),
            Value::I16(v) => self.write_i16(*v),
            Value::U16(v) => self.write_u16(*v),
            Value::I32(v) => self.write_i32(*v),
            Value::U32(v) => self.write_u32(*v),
            Value::I64(v) => self.write_i64(*v),
            Value::U64(v) => self.write_u64(*v),
            Value::F32(v) => self.write_f32(*v),
            Value::F64(v) => self.write_f64(*v),
            Value::Decimal(v) => self.write_decimal(*v),
            Value::Char(v) => self.write_char(*v),
            Value::Str(v) => self.write_str(v),
            Value::Timestamp(v) => self.write_timestamp(*v),
            Value::Bytes(v) => self.write_bytes(v),
            Value::StrArray(v) => self.write_str_array(v),
        }
    }

    /// Finalize the stream in place: pad the buffered tail, encrypt and
    /// write the final block, and flush the sink.
    ///
    /// Idempotent; once the session is closed, for any reason, further
    /// calls return `Ok(())`. After closing, any `write_*` call fails with
    /// [`BincryptError::SessionClosed`].
    pub fn try_finish(&mut self) -> Result<(), BincryptError> {
        if self.closed {
            return Ok(());
        }
        // Marked closed up front so a failed final write is not repeated
        // with an already-consumed transform.
        self.closed = true;

        let encryptor = self
            .encryptor
            .take()
            .expect("transform present until close");
        let mut trailer = [0u8; MAX_BLOCK_LEN];
        let written = encryptor.finalize(&self.buf, &mut trailer)?;
        wipe_buffer(&mut self.buf);

        let sink = self.sink.as_mut().expect("sink present until finish");
        sink.write_all(&trailer[..written])?;
        sink.flush()?;
        Ok(())
    }

    /// Finalize the stream and return the underlying sink.
    pub fn finish(mut self) -> Result<W, BincryptError> {
        self.try_finish()?;
        Ok(self.sink.take().expect("sink present until finish"))
    }
}

impl<W: Write> fmt::Debug for EncryptWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptWriter")
            .field("block_len", &self.block_len)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<W: Write> Drop for EncryptWriter<W> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.try_finish();
        }
    }
}
