use core::fmt;
use std::{io, sync::LazyLock};

use rand::{CryptoRng, RngCore};
#[cfg(feature = "tracing")]
use tracing::instrument;

use super::SecureByteCache;
use crate::{EntropySource, Guid, OsEntropy, Pool, PoolConfig};

/// Reads longer than this bypass the cache and go straight to the entropy
/// source.
pub const MAX_CACHED_READ: usize = 512;

#[cfg(feature = "cache-padded")]
type Cache = crossbeam_utils::CachePadded<SecureByteCache>;
#[cfg(not(feature = "cache-padded"))]
type Cache = SecureByteCache;

#[cfg(feature = "cache-padded")]
fn new_cache() -> Cache {
    crossbeam_utils::CachePadded::new(SecureByteCache::new())
}
#[cfg(not(feature = "cache-padded"))]
fn new_cache() -> Cache {
    SecureByteCache::new()
}

/// A pool of [`SecureByteCache`]s in front of an [`EntropySource`].
///
/// Small reads are served from pooled 4096-byte buffers so that most calls
/// never reach the operating system. Each cache is used by one thread at a
/// time; the pool's free lists are the only synchronization.
///
/// Most callers want the process-wide instance behind [`fill`], [`Reader`]
/// and [`Guid::new`]. Build a dedicated one to control pool sizing or to
/// substitute the entropy source.
pub struct SecureReader<E = OsEntropy> {
    entropy: E,
    pool: Pool<Cache>,
}

impl SecureReader {
    /// Creates a reader over the operating system RNG with default pool
    /// sizing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_entropy(OsEntropy, PoolConfig::default())
    }
}

impl Default for SecureReader {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntropySource> SecureReader<E> {
    /// Creates a reader over `entropy` with the given pool sizing.
    #[must_use]
    pub fn with_entropy(entropy: E, config: PoolConfig) -> Self {
        Self {
            entropy,
            pool: Pool::new(config),
        }
    }

    /// Fills `dst` entirely with cryptographically secure random bytes.
    ///
    /// Reads of up to [`MAX_CACHED_READ`] bytes are served from a pooled cache;
    /// larger reads call the entropy source directly.
    #[inline]
    pub fn fill(&self, dst: &mut [u8]) {
        match dst.len() {
            0 => {}
            n if n > MAX_CACHED_READ => self.fill_uncached(dst),
            _ => {
                let mut cache = self.pool.checkout_with(new_cache);
                cache.fill(&self.entropy, dst);
            }
        }
    }

    /// Draws one cached 16-byte slot as a [`Guid`].
    #[inline]
    pub fn next_guid(&self) -> Guid {
        let mut cache = self.pool.checkout_with(new_cache);
        Guid::from_bytes(cache.next_guid_bytes(&self.entropy))
    }

    /// The underlying entropy source.
    pub fn entropy(&self) -> &E {
        &self.entropy
    }

    /// The cache pool, mostly for inspection.
    pub fn pool(&self) -> &Pool<impl fmt::Debug> {
        &self.pool
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all, fields(len = dst.len())))]
    fn fill_uncached(&self, dst: &mut [u8]) {
        self.entropy.fill_entropy(dst);
    }
}

impl<E> fmt::Debug for SecureReader<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureReader")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// The process-wide secure reader.
static SECURE_READER: LazyLock<SecureReader> = LazyLock::new(SecureReader::new);

/// Fills `dst` with cryptographically secure random bytes from the
/// process-wide pooled reader.
///
/// Never fails and always fills `dst` completely. Reads of up to 512 bytes are
/// several times cheaper than calling the OS RNG directly.
///
/// # Example
/// ```
/// let mut key = [0u8; 32];
/// fastguid::fill(&mut key);
/// ```
#[inline]
pub fn fill(dst: &mut [u8]) {
    SECURE_READER.fill(dst);
}

/// Draws one guid from the process-wide pooled reader.
#[inline]
pub(crate) fn next_guid() -> Guid {
    SECURE_READER.next_guid()
}

/// A handle to the process-wide secure reader.
///
/// Implements [`std::io::Read`] and [`rand::RngCore`], so it can stand in
/// wherever a reader or an RNG is expected. Reads always fill the whole
/// buffer and never return an error.
///
/// # Example
/// ```
/// use rand::Rng;
/// use std::io::Read;
///
/// let mut reader = fastguid::Reader;
/// let mut buf = [0u8; 24];
/// assert_eq!(reader.read(&mut buf).unwrap(), 24);
///
/// let roll: u8 = reader.random_range(1..=6);
/// assert!((1..=6).contains(&roll));
/// ```
#[derive(Default, Clone, Copy, Debug)]
pub struct Reader;

impl io::Read for Reader {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        fill(buf);
        Ok(buf.len())
    }
}

impl RngCore for Reader {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    #[inline]
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        fill(dst);
    }
}

impl CryptoRng for Reader {}

/// Lets the pooled reader key other generators, as [`crate::LiteSource`]
/// does.
impl EntropySource for Reader {
    #[inline]
    fn fill_entropy(&self, dst: &mut [u8]) {
        fill(dst);
    }
}
