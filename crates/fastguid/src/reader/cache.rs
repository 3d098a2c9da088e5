#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{EntropySource, GUID_SIZE};

/// Number of guid-sized slots in one [`SecureByteCache`].
///
/// Must stay 256 so that the `u8` cursor wraps to zero exactly when the buffer
/// is used up.
pub const GUIDS_PER_CACHE: usize = 256;

/// Size in bytes of one [`SecureByteCache`] buffer.
pub const CACHE_SIZE: usize = GUID_SIZE * GUIDS_PER_CACHE;

const _: () = {
    assert!(GUIDS_PER_CACHE == u8::MAX as usize + 1);
    assert!(CACHE_SIZE == 4096);
};

/// A 4096-byte buffer of secure random bytes served in 16-byte slots.
///
/// `cursor` indexes the next unconsumed slot. A cursor of zero means the
/// buffer is empty (either never filled or fully consumed and wrapped), and the
/// next read refills all 4096 bytes from the entropy source.
#[derive(Clone)]
pub struct SecureByteCache {
    buffer: [u8; CACHE_SIZE],
    cursor: u8,
}

impl SecureByteCache {
    /// Creates an empty cache. The buffer is filled on first use.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; CACHE_SIZE],
            cursor: 0,
        }
    }

    /// Index of the next unconsumed slot.
    #[must_use]
    pub const fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Bytes left before the buffer must be refilled.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        CACHE_SIZE - self.cursor as usize * GUID_SIZE
    }

    /// Returns the next 16-byte slot, refilling first if the cursor has
    /// wrapped.
    #[inline]
    pub fn next_guid_bytes<E: EntropySource>(&mut self, entropy: &E) -> [u8; GUID_SIZE] {
        if self.cursor == 0 {
            self.refill(entropy);
        }
        let start = self.cursor as usize * GUID_SIZE;
        let mut out = [0u8; GUID_SIZE];
        out.copy_from_slice(&self.buffer[start..start + GUID_SIZE]);
        self.cursor = self.cursor.wrapping_add(1);
        out
    }

    /// Copies `dst.len()` bytes out of the cache and advances the cursor by
    /// the number of slots touched, rounded up.
    ///
    /// If fewer than `dst.len()` bytes remain, the whole buffer is refilled and
    /// reading restarts at slot zero.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is longer than [`CACHE_SIZE`].
    #[inline]
    pub fn fill<E: EntropySource>(&mut self, entropy: &E, dst: &mut [u8]) {
        let n = dst.len();
        assert!(
            n <= CACHE_SIZE,
            "cache read of {n} bytes exceeds {CACHE_SIZE}"
        );

        if n > self.remaining() {
            self.refill(entropy);
            self.cursor = 0;
        } else if self.cursor == 0 {
            self.refill(entropy);
        }

        let start = self.cursor as usize * GUID_SIZE;
        dst.copy_from_slice(&self.buffer[start..start + n]);

        // A full 256-slot read truncates to 0, which leaves the cache empty.
        #[allow(clippy::cast_possible_truncation)]
        let slots = n.div_ceil(GUID_SIZE) as u8;
        self.cursor = self.cursor.wrapping_add(slots);
    }

    #[inline(never)]
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn refill<E: EntropySource>(&mut self, entropy: &E) {
        entropy.fill_entropy(&mut self.buffer);
    }
}

impl Default for SecureByteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SecureByteCache {
    // Never print the buffered random bytes.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SecureByteCache")
            .field("cursor", &self.cursor)
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}
