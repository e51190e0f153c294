// ============================================================================
// FILE: src/utils.rs
// ============================================================================

//! Utility functions used across the library.

use zeroize::Zeroize;

/// Zeroes a buffer's entire allocation and empties it.
///
/// `Vec::drain` shifts surviving bytes to the front but leaves stale copies
/// in the capacity region past the new length, so plaintext staging buffers
/// are wiped over their full capacity, not just `0..len`.
#[inline(always)]
pub(crate) fn wipe_buffer(buf: &mut Vec<u8>) {
    let capacity = buf.capacity();
    buf.resize(capacity, 0);
    buf.zeroize();
}
