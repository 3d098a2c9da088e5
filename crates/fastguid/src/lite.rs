//! High-throughput pseudorandom bytes from pooled, self-rekeying generators.
//!
//! Each pooled [`LiteGenerator`] is a ChaCha-based [`StdRng`] seeded once with
//! a 256-bit key from the secure reader. After every [`LITE_RESEED_BYTES`]
//! bytes of output it draws a fresh key from its own stream and discards the
//! old state, so a later compromise of the generator cannot reveal earlier
//! output.
//!
//! This path is faster than [`crate::fill`] for bulk reads, at a small and
//! bounded cost in security margin. Use [`crate::fill`] for long-term keys.

use core::fmt;
use std::{io, sync::LazyLock};

use rand::{RngCore, SeedableRng, rngs::StdRng};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{EntropySource, Pool, PoolConfig, Reader};

/// Output bytes produced under one key before a [`LiteGenerator`] rekeys.
pub const LITE_RESEED_BYTES: usize = 1024;

/// Length of a [`LiteGenerator`] key.
pub const LITE_KEY_SIZE: usize = 32;

/// A stream generator with key erasure every [`LITE_RESEED_BYTES`].
pub struct LiteGenerator {
    rng: StdRng,
    budget: usize,
}

impl LiteGenerator {
    /// Creates a generator from an explicit 256-bit key.
    ///
    /// Output is fully determined by the key, so this is only appropriate for
    /// tests and reproducible simulations.
    #[must_use]
    pub fn from_key(key: [u8; LITE_KEY_SIZE]) -> Self {
        Self {
            rng: StdRng::from_seed(key),
            budget: LITE_RESEED_BYTES,
        }
    }

    /// Creates a generator keyed from `entropy`.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    pub fn from_entropy<E: EntropySource>(entropy: &E) -> Self {
        let mut key = [0u8; LITE_KEY_SIZE];
        entropy.fill_entropy(&mut key);
        let generator = Self::from_key(key);
        key.fill(0);
        generator
    }

    /// Fills `dst` entirely, rekeying whenever the current key's budget is
    /// spent.
    #[inline]
    pub fn fill(&mut self, dst: &mut [u8]) {
        let mut rest = dst;
        while !rest.is_empty() {
            if self.budget == 0 {
                self.rekey();
            }
            let take = rest.len().min(self.budget);
            let (head, tail) = core::mem::take(&mut rest).split_at_mut(take);
            self.rng.fill_bytes(head);
            self.budget -= take;
            rest = tail;
        }
    }

    #[cold]
    fn rekey(&mut self) {
        let mut key = [0u8; LITE_KEY_SIZE];
        self.rng.fill_bytes(&mut key);
        self.rng = StdRng::from_seed(key);
        key.fill(0);
        self.budget = LITE_RESEED_BYTES;
        #[cfg(feature = "tracing")]
        tracing::trace!("lite generator rekeyed");
    }
}

impl fmt::Debug for LiteGenerator {
    // Never print generator state.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteGenerator")
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

/// A pool of [`LiteGenerator`]s, each keyed from `E` on creation.
pub struct LiteSource<E = Reader> {
    seed: E,
    pool: Pool<LiteGenerator>,
}

impl LiteSource {
    /// Creates a source keyed from the process-wide secure reader.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(Reader, PoolConfig::default())
    }
}

impl Default for LiteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntropySource> LiteSource<E> {
    /// Creates a source whose generators are keyed from `seed`.
    #[must_use]
    pub fn with_seed(seed: E, config: PoolConfig) -> Self {
        Self {
            seed,
            pool: Pool::new(config),
        }
    }

    /// Fills `dst` entirely with pseudorandom bytes from a pooled generator.
    #[inline]
    pub fn fill(&self, dst: &mut [u8]) {
        if dst.is_empty() {
            return;
        }
        let mut generator = self
            .pool
            .checkout_with(|| LiteGenerator::from_entropy(&self.seed));
        generator.fill(dst);
    }

    /// The generator pool, mostly for inspection.
    pub fn pool(&self) -> &Pool<LiteGenerator> {
        &self.pool
    }
}

impl<E> fmt::Debug for LiteSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteSource")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

static LITE_SOURCE: LazyLock<LiteSource> = LazyLock::new(LiteSource::new);

/// Fills `dst` with pseudorandom bytes from the process-wide lite pool.
///
/// Never fails and always fills `dst` completely.
///
/// # Example
/// ```
/// let mut noise = vec![0u8; 64 * 1024];
/// fastguid::fill_lite(&mut noise);
/// ```
#[inline]
pub fn fill_lite(dst: &mut [u8]) {
    LITE_SOURCE.fill(dst);
}

/// A handle to the process-wide lite pool, implementing [`std::io::Read`] and
/// [`rand::RngCore`].
#[derive(Default, Clone, Copy, Debug)]
pub struct LiteReader;

impl io::Read for LiteReader {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        fill_lite(buf);
        Ok(buf.len())
    }
}

impl RngCore for LiteReader {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        fill_lite(&mut buf);
        u32::from_le_bytes(buf)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        fill_lite(&mut buf);
        u64::from_le_bytes(buf)
    }

    #[inline]
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        fill_lite(dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portable_atomic::{AtomicUsize, Ordering};
    use std::collections::HashSet;
    use std::thread::scope;

    const KEY: [u8; LITE_KEY_SIZE] = [7; LITE_KEY_SIZE];

    #[derive(Default)]
    struct CountingSeed {
        calls: AtomicUsize,
    }

    impl EntropySource for CountingSeed {
        fn fill_entropy(&self, dst: &mut [u8]) {
            let call = self.calls.fetch_add(1, Ordering::Relaxed);
            dst.fill(call as u8 + 1);
        }
    }

    #[test]
    fn first_key_matches_plain_stream() {
        let mut generator = LiteGenerator::from_key(KEY);
        let mut out = [0u8; LITE_RESEED_BYTES];
        generator.fill(&mut out);

        let mut reference = StdRng::from_seed(KEY);
        let mut expected = [0u8; LITE_RESEED_BYTES];
        reference.fill_bytes(&mut expected);

        assert_eq!(out, expected);
    }

    #[test]
    fn rekeys_after_budget() {
        let mut generator = LiteGenerator::from_key(KEY);
        let mut out = vec![0u8; 2 * LITE_RESEED_BYTES];
        generator.fill(&mut out);

        let mut reference = StdRng::from_seed(KEY);
        let mut continued = vec![0u8; 2 * LITE_RESEED_BYTES];
        reference.fill_bytes(&mut continued);

        assert_eq!(out[..LITE_RESEED_BYTES], continued[..LITE_RESEED_BYTES]);
        assert_ne!(out[LITE_RESEED_BYTES..], continued[LITE_RESEED_BYTES..]);
    }

    #[test]
    fn word_aligned_reads_match_one_large_read() {
        let mut whole = LiteGenerator::from_key(KEY);
        let mut expected = vec![0u8; 5000];
        whole.fill(&mut expected);

        // StdRng hands out whole u32 words and drops the unused tail of a
        // partly read word, so only multiples of 4 line up with the stream.
        let mut pieces = LiteGenerator::from_key(KEY);
        let mut actual = vec![0u8; 5000];
        for chunk in actual.chunks_mut(332) {
            pieces.fill(chunk);
        }

        assert_eq!(actual, expected);
        assert_eq!(pieces.budget, whole.budget);
    }

    #[test]
    fn rekey_schedule_counts_bytes_handed_out() {
        let mut whole = LiteGenerator::from_key(KEY);
        let mut buf = vec![0u8; 5000];
        whole.fill(&mut buf);

        let mut pieces = LiteGenerator::from_key(KEY);
        let mut total = 0;
        for chunk in buf.chunks_mut(333) {
            pieces.fill(chunk);
            total += chunk.len();
        }

        // 5000 bytes span four full keys and 904 bytes of a fifth.
        assert_eq!(total, 5000);
        assert_eq!(whole.budget, 5 * LITE_RESEED_BYTES - 5000);
        assert_eq!(pieces.budget, whole.budget);
    }

    #[test]
    fn generators_are_keyed_once_and_reused() {
        let source = LiteSource::with_seed(
            CountingSeed::default(),
            PoolConfig {
                shards: 1,
                capacity: 1,
            },
        );

        source.fill(&mut []);
        assert_eq!(source.seed.calls.load(Ordering::Relaxed), 0);

        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        source.fill(&mut a);
        source.fill(&mut b);

        assert_eq!(source.seed.calls.load(Ordering::Relaxed), 1);
        assert_eq!(source.pool().idle(), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn each_new_generator_gets_a_fresh_key() {
        let source = LiteSource::with_seed(
            CountingSeed::default(),
            PoolConfig {
                shards: 1,
                capacity: 2,
            },
        );

        // Hold the first generator (key [1; 32]) so the fill must key another.
        let held = source
            .pool
            .checkout_with(|| LiteGenerator::from_entropy(&source.seed));
        let mut actual = [0u8; 32];
        source.fill(&mut actual);
        drop(held);

        let mut expected = [0u8; 32];
        LiteGenerator::from_key([2; LITE_KEY_SIZE]).fill(&mut expected);

        assert_eq!(source.seed.calls.load(Ordering::Relaxed), 2);
        assert_eq!(actual, expected);
        assert_eq!(source.pool().idle(), 2);
    }

    #[test]
    fn global_fill_lite_is_unique_across_threads() {
        let threads = num_cpus::get().clamp(2, 8);
        let seen = std::sync::Mutex::new(HashSet::new());

        scope(|s| {
            for _ in 0..threads {
                s.spawn(|| {
                    let mut local = Vec::with_capacity(1_000);
                    for _ in 0..1_000 {
                        let mut buf = [0u8; 16];
                        fill_lite(&mut buf);
                        local.push(buf);
                    }
                    let mut seen = seen.lock().unwrap();
                    for buf in local {
                        assert!(seen.insert(buf), "duplicate lite output");
                    }
                });
            }
        });
    }

    #[test]
    fn lite_reader_fills_fully() {
        use std::io::Read;

        let mut buf = vec![0u8; 10_000];
        assert_eq!(LiteReader.read(&mut buf).unwrap(), 10_000);
        assert!(buf.iter().any(|&b| b != 0));
        assert_ne!(LiteReader.next_u64(), LiteReader.next_u64());
    }
}
