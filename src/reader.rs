//! # Decrypting Stream Reader
//!
//! A reading session over any [`Read`] source. The reader consumes the salt
//! prefix at construction, then pulls ciphertext in chunks, decrypting every
//! whole block. The most recently decrypted block is withheld from the
//! plaintext queue until more ciphertext arrives or the source ends; at end
//! of stream the withheld block is the PKCS#7 trailer and is validated and
//! stripped. This is what lets the format carry no length field: the final
//! block identifies itself by position.
//!
//! Frame shapes mirror [`EncryptWriter`](crate::writer::EncryptWriter);
//! reads must be issued in the same kind order the values were written in.
//! A mismatched order is not detected as such and yields reinterpreted
//! bytes, a frame error, or a truncation error.

use crate::algorithm::Algorithm;
use crate::aliases::Password;
use crate::cipher::{strip_padding, CipherDecryptor};
use crate::consts::{FRAME_FILL_CHUNK, MAX_BLOCK_LEN, READ_CHUNK_LEN, SALT_LEN};
use crate::error::BincryptError;
use crate::kdf;
use crate::utils::wipe_buffer;
use crate::value::{Value, ValueKind};

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::io::{self, Read};

/// Decrypting session over a byte source.
///
/// Dropping the reader releases the transform and wipes buffered plaintext.
pub struct DecryptReader<R: Read> {
    source: R,
    decryptor: CipherDecryptor,
    block_len: usize,
    /// Ciphertext accumulator holding less than one block between pulls.
    pending: Vec<u8>,
    /// Most recently decrypted block, withheld as the candidate trailer.
    held: Option<[u8; MAX_BLOCK_LEN]>,
    /// Decrypted plaintext ready for frame reads; `pos` is the read cursor.
    plain: Vec<u8>,
    pos: usize,
    exhausted: bool,
}

impl<R: Read> DecryptReader<R> {
    /// Open a session: read the salt prefix, derive the key and IV, and
    /// build the transform. No ciphertext is consumed until the first read.
    pub(crate) fn new(
        algorithm: Algorithm,
        password: &Password,
        mut source: R,
    ) -> Result<Self, BincryptError> {
        let mut salt = [0u8; SALT_LEN];
        source.read_exact(&mut salt).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                BincryptError::TruncatedStream("salt prefix requires 8 bytes")
            }
            _ => BincryptError::Io(e),
        })?;

        let (key, iv) = kdf::derive_key_iv(password, &salt, algorithm)?;
        let decryptor = CipherDecryptor::new(algorithm, &key, &iv)?;

        Ok(Self {
            source,
            decryptor,
            block_len: algorithm.block_len(),
            pending: Vec::new(),
            held: None,
            plain: Vec::new(),
            pos: 0,
            exhausted: false,
        })
    }

    #[inline(always)]
    fn available(&self) -> usize {
        self.plain.len() - self.pos
    }

    /// Pull one chunk of ciphertext from the source, or finalize on EOF.
    fn pull_ciphertext(&mut self) -> Result<(), BincryptError> {
        let mut chunk = [0u8; READ_CHUNK_LEN];
        let n = match self.source.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(BincryptError::Io(e)),
        };
        if n == 0 {
            self.finish_stream()
        } else {
            self.absorb(&chunk[..n]);
            Ok(())
        }
    }

    /// Decrypt every whole block of accumulated ciphertext, queueing all
    /// plaintext except the newest block, which replaces the withheld one.
    fn absorb(&mut self, ciphertext: &[u8]) {
        self.pending.extend_from_slice(ciphertext);
        let full = self.pending.len() - self.pending.len() % self.block_len;
        if full == 0 {
            return;
        }

        self.decryptor.decrypt_blocks(&mut self.pending[..full]);

        if let Some(held) = self.held.take() {
            self.plain.extend_from_slice(&held[..self.block_len]);
        }
        let withheld_start = full - self.block_len;
        self.plain.extend_from_slice(&self.pending[..withheld_start]);

        let mut held = [0u8; MAX_BLOCK_LEN];
        held[..self.block_len].copy_from_slice(&self.pending[withheld_start..full]);
        self.held = Some(held);

        self.pending.drain(..full);
    }

    /// Source is exhausted: the withheld block is the trailer. Validate its
    /// padding and queue whatever plaintext it carried.
    fn finish_stream(&mut self) -> Result<(), BincryptError> {
        self.exhausted = true;
        if !self.pending.is_empty() {
            return Err(BincryptError::TruncatedStream(
                "ciphertext is not a whole number of blocks",
            ));
        }
        if let Some(held) = self.held.take() {
            let tail = strip_padding(&held[..self.block_len])?;
            self.plain.extend_from_slice(tail);
        }
        Ok(())
    }

    /// Ensure at least `needed` bytes of plaintext are queued. The consumed
    /// prefix is reclaimed before the queue grows, so retained plaintext
    /// stays proportional to a single fill rather than the largest frame.
    fn fill_plain(&mut self, needed: usize) -> Result<(), BincryptError> {
        if self.available() < needed && self.pos > 0 {
            self.plain.drain(..self.pos);
            self.pos = 0;
        }
        while self.available() < needed && !self.exhausted {
            self.pull_ciphertext()?;
        }
        if self.available() < needed {
            return Err(BincryptError::TruncatedStream(
                "value frame extends past the end of the stream",
            ));
        }
        Ok(())
    }

    /// Copy the next `out.len()` plaintext bytes into `out`.
    fn read_plain(&mut self, out: &mut [u8]) -> Result<(), BincryptError> {
        self.fill_plain(out.len())?;
        let end = self.pos + out.len();
        out.copy_from_slice(&self.plain[self.pos..end]);
        self.pos = end;
        if self.pos == self.plain.len() {
            self.plain.clear();
            self.pos = 0;
        }
        Ok(())
    }

    /// Read exactly `N` plaintext bytes into a stack-allocated `[u8; N]`.
    #[inline(always)]
    fn read_span<const N: usize>(&mut self) -> Result<[u8; N], BincryptError> {
        let mut buf = [0u8; N];
        self.read_plain(&mut buf)?;
        Ok(buf)
    }

    /// Read a `bool`. Zero is `false`; any other byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool, BincryptError> {
        Ok(self.read_span::<1>()?[0] != 0)
    }

    /// Read an `i8`.
    pub fn read_i8(&mut self) -> Result<i8, BincryptError> {
        Ok(self.read_span::<1>()?[0] as i8)
    }

    /// Read a `u8`.
    pub fn read_u8(&mut self) -> Result<u8, BincryptError> {
        Ok(self.read_span::<1>()?[0])
    }

    /// Read an `i16`.
    pub fn read_i16(&mut self) -> Result<i16, BincryptError> {
        Ok(LittleEndian::read_i16(&self.read_span::<2>()?))
    }

    /// Read a `u16`.
    pub fn read_u16(&mut self) -> Result<u16, BincryptError> {
        Ok(LittleEndian::read_u16(&self.read_span::<2>()?))
    }

    /// Read an `i32`.
    pub fn read_i32(&mut self) -> Result<i32, BincryptError> {
        Ok(LittleEndian::read_i32(&self.read_span::<4>()?))
    }

    /// Read a `u32`.
    pub fn read_u32(&mut self) -> Result<u32, BincryptError> {
        Ok(LittleEndian::read_u32(&self.read_span::<4>()?))
    }

    /// Read an `i64`.
    pub fn read_i64(&mut self) -> Result<i64, BincryptError> {
        Ok(LittleEndian::read_i64(&self.read_span::<8>()?))
    }

    /// Read a `u64`.
    pub fn read_u64(&mut self) -> Result<u64, BincryptError> {
        Ok(LittleEndian::read_u64(&self.read_span::<8>()?))
    }

    /// Read an `f32` from its IEEE-754 bit pattern.
    pub fn read_f32(&mut self) -> Result<f32, BincryptError> {
        Ok(LittleEndian::read_f32(&self.read_span::<4>()?))
    }

    /// Read an `f64` from its IEEE-754 bit pattern.
    pub fn read_f64(&mut self) -> Result<f64, BincryptError> {
        Ok(LittleEndian::read_f64(&self.read_span::<8>()?))
    }

    /// Read a [`Decimal`] from its 16-byte portable representation.
    pub fn read_decimal(&mut self) -> Result<Decimal, BincryptError> {
        Ok(Decimal::deserialize(self.read_span::<16>()?))
    }

    /// Read a `char` from its UTF-8 encoding. The first byte determines the
    /// width; the decoded sequence must be a single valid scalar.
    pub fn read_char(&mut self) -> Result<char, BincryptError> {
        let first = self.read_span::<1>()?[0];
        let width = match first.leading_ones() {
            0 => 1,
            2 => 2,
            3 => 3,
            4 => 4,
            _ => {
                return Err(BincryptError::InvalidFrame(format!(
                    "invalid UTF-8 scalar leading byte: {first:#04x}"
                )))
            }
        };

        let mut buf = [first, 0, 0, 0];
        self.read_plain(&mut buf[1..width])?;
        let text = std::str::from_utf8(&buf[..width])
            .map_err(|_| BincryptError::InvalidFrame("invalid UTF-8 scalar".into()))?;
        text.chars()
            .next()
            .ok_or_else(|| BincryptError::InvalidFrame("empty UTF-8 scalar".into()))
    }

    /// Read a UTC timestamp from microseconds since the Unix epoch.
    pub fn read_timestamp(&mut self) -> Result<DateTime<Utc>, BincryptError> {
        let micros = self.read_i64()?;
        DateTime::from_timestamp_micros(micros).ok_or_else(|| {
            BincryptError::InvalidFrame(format!("timestamp out of range: {micros}"))
        })
    }

    /// Read a varint (LEB128) length prefix, capped at the frame limit.
    fn read_varint_len(&mut self) -> Result<usize, BincryptError> {
        let mut raw = [0u8; 5];
        let mut filled = 0;
        loop {
            let byte = self.read_span::<1>()?[0];
            raw[filled] = byte;
            filled += 1;
            if byte & 0x80 == 0 {
                break;
            }
            if filled == raw.len() {
                return Err(BincryptError::InvalidFrame(
                    "length prefix runs past 5 bytes".into(),
                ));
            }
        }

        let (len, _) = unsigned_varint::decode::u32(&raw[..filled])
            .map_err(|e| BincryptError::InvalidFrame(format!("length prefix: {e}")))?;
        if len > i32::MAX as u32 {
            return Err(BincryptError::InvalidFrame(
                "length prefix exceeds the frame limit".into(),
            ));
        }
        Ok(len as usize)
    }

    /// Read a 4-byte element or byte count, rejecting negatives.
    fn read_count(&mut self, what: &'static str) -> Result<usize, BincryptError> {
        let declared = self.read_i32()?;
        usize::try_from(declared).map_err(|_| {
            BincryptError::InvalidFrame(format!("{what} length is negative: {declared}"))
        })
    }

    /// Fill a frame payload in bounded steps. A corrupt length prefix then
    /// hits [`BincryptError::TruncatedStream`] after at most one step of
    /// over-allocation instead of reserving the whole claimed length.
    fn read_frame_payload(&mut self, len: usize) -> Result<Vec<u8>, BincryptError> {
        let mut bytes = Vec::new();
        let mut remaining = len;
        while remaining > 0 {
            let step = remaining.min(FRAME_FILL_CHUNK);
            let start = bytes.len();
            bytes.resize(start + step, 0);
            self.read_plain(&mut bytes[start..])?;
            remaining -= step;
        }
        Ok(bytes)
    }

    /// Read a string frame: varint byte length, then UTF-8 bytes.
    pub fn read_str(&mut self) -> Result<String, BincryptError> {
        let len = self.read_varint_len()?;
        let bytes = self.read_frame_payload(len)?;
        String::from_utf8(bytes)
            .map_err(|_| BincryptError::InvalidFrame("string frame is not valid UTF-8".into()))
    }

    /// Read a byte-array frame: 4-byte length, then raw bytes.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, BincryptError> {
        let len = self.read_count("byte array")?;
        self.read_frame_payload(len)
    }

    /// Read a string-array frame: 4-byte element count, then one string
    /// frame per element.
    pub fn read_str_array(&mut self) -> Result<Vec<String>, BincryptError> {
        let count = self.read_count("string array")?;
        let mut values = Vec::new();
        for _ in 0..count {
            values.push(self.read_str()?);
        }
        Ok(values)
    }

    /// Read the next value as the given kind, dispatching to the matching
    /// typed method.
    pub fn read_value(&mut self, kind: ValueKind) -> Result<Value, BincryptError> {
        match kind {
            ValueKind::Bool => self.read_bool().map(Value::Bool),
            ValueKind::I8 => self.read_i8().map(Value::I8),
            ValueKind::U8 => self.read_u8().map(Value::U8),
            ValueKind::I16 => self.read_i16().map(Value::I16),
            ValueKind::U16 => self.read_u16().map(Value::U16),
            ValueKind::I32 => self.read_i32().map(Value::I32),
            ValueKind::U32 => self.read_u32().map(Value::U32),
            ValueKind::I64 => self.read_i64().map(Value::I64),
            ValueKind::U64 => self.read_u64().map(Value::U64),
            ValueKind::F32 => self.read_f32().map(Value::F32),
            ValueKind::F64 => self.read_f64().map(Value::F64),
            ValueKind::Decimal => self.read_decimal().map(Value::Decimal),
            ValueKind::Char => self.read_char().map(Value::Char),
            ValueKind::Str => self.read_str().map(Value::Str),
            ValueKind::Timestamp => self.read_timestamp().map(Value::Timestamp),
            ValueKind::Bytes => self.read_bytes().map(Value::Bytes),
            ValueKind::StrArray => self.read_str_array().map(Value::StrArray),
        }
    }
}

impl<R: Read> fmt::Debug for DecryptReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptReader")
            .field("block_len", &self.block_len)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl<R: Read> Drop for DecryptReader<R> {
    fn drop(&mut self) {
        wipe_buffer(&mut self.plain);
        wipe_buffer(&mut self.pending);
    }
}
