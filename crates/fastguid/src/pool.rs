//! A sharded checkout/return free list.
//!
//! [`Pool`] is the only state shared between threads in this crate. A value
//! that has been checked out is owned exclusively by its [`Pooled`] guard
//! until the guard is dropped, at which point it goes back onto a free list.
//! Nothing locks the value itself.
//!
//! Each thread is pinned to one shard by a round-robin hint assigned on first
//! use, so threads on different cores rarely touch the same lock. A checkout
//! that finds its shard empty constructs a fresh value instead of waiting, and
//! a return to a full shard drops the value, which bounds memory under
//! pathological contention.

use core::{
    fmt,
    ops::{Deref, DerefMut},
};
use std::num::NonZeroUsize;

use portable_atomic::{AtomicUsize, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::mutex::{Mutex, lock};

#[cfg(feature = "cache-padded")]
type Shard<T> = crossbeam_utils::CachePadded<Mutex<Vec<Box<T>>>>;
#[cfg(not(feature = "cache-padded"))]
type Shard<T> = Mutex<Vec<Box<T>>>;

static NEXT_SHARD_HINT: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static SHARD_HINT: usize = NEXT_SHARD_HINT.fetch_add(1, Ordering::Relaxed);
}

/// Sizing for a [`Pool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of independent free lists. Clamped to at least one.
    pub shards: usize,
    /// Maximum number of idle values kept per shard. Values returned to a full
    /// shard are dropped.
    pub capacity: usize,
}

impl PoolConfig {
    /// Idle values kept per shard by [`PoolConfig::default`].
    pub const DEFAULT_CAPACITY: usize = 4;
}

impl Default for PoolConfig {
    /// One shard per available hardware thread.
    fn default() -> Self {
        Self {
            shards: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}

/// A free list of boxed values with remove-or-create checkout.
///
/// There is no ordering or fairness between checkouts: any idle value may be
/// handed to any caller.
pub struct Pool<T> {
    shards: Box<[Shard<T>]>,
    capacity: usize,
}

impl<T> Pool<T> {
    /// Creates an empty pool. No value is allocated until the first checkout.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        let shards = (0..config.shards.max(1))
            .map(|_| new_shard(Vec::with_capacity(config.capacity)))
            .collect();
        Self {
            shards,
            capacity: config.capacity,
        }
    }

    /// Removes an idle value from this thread's shard, or builds one with
    /// `init` if the shard is empty.
    #[inline]
    pub fn checkout_with(&self, init: impl FnOnce() -> T) -> Pooled<'_, T> {
        let idle = lock(self.shard()).pop();
        let item = match idle {
            Some(item) => item,
            None => self.allocate(init),
        };
        Pooled {
            pool: self,
            item: Some(item),
        }
    }

    /// Number of idle values across all shards.
    pub fn idle(&self) -> usize {
        self.shards.iter().map(|shard| lock(shard).len()).sum()
    }

    /// Number of shards the pool was built with.
    pub fn shards(&self) -> usize {
        self.shards.len()
    }

    #[cold]
    #[inline(never)]
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn allocate(&self, init: impl FnOnce() -> T) -> Box<T> {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            item = core::any::type_name::<T>(),
            "pool shard empty, allocating"
        );
        Box::new(init())
    }

    #[inline]
    fn shard(&self) -> &Shard<T> {
        let hint = SHARD_HINT.with(|hint| *hint);
        &self.shards[hint % self.shards.len()]
    }

    #[inline]
    fn give_back(&self, item: Box<T>) {
        let mut free = lock(self.shard());
        if free.len() < self.capacity {
            free.push(item);
            return;
        }
        drop(free);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            item = core::any::type_name::<T>(),
            "pool shard full, dropping returned value"
        );
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("shards", &self.shards.len())
            .field("capacity", &self.capacity)
            .field("idle", &self.idle())
            .finish()
    }
}

#[cfg(feature = "cache-padded")]
fn new_shard<T>(free: Vec<Box<T>>) -> Shard<T> {
    crossbeam_utils::CachePadded::new(Mutex::new(free))
}

#[cfg(not(feature = "cache-padded"))]
fn new_shard<T>(free: Vec<Box<T>>) -> Shard<T> {
    Mutex::new(free)
}

/// Exclusive access to a checked-out value. Dropping the guard returns the
/// value to its pool.
pub struct Pooled<'a, T> {
    pool: &'a Pool<T>,
    // `Some` from checkout until `drop`.
    item: Option<Box<T>>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        let Some(item) = self.item.as_deref() else {
            unreachable!("pooled value used after return");
        };
        item
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        let Some(item) = self.item.as_deref_mut() else {
            unreachable!("pooled value used after return");
        };
        item
    }
}

impl<T> Drop for Pooled<'_, T> {
    #[inline]
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.give_back(item);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&**self).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::scope;

    fn single_shard(capacity: usize) -> Pool<u32> {
        Pool::new(PoolConfig {
            shards: 1,
            capacity,
        })
    }

    #[test]
    fn checkout_on_empty_pool_constructs() {
        let pool = single_shard(4);
        assert_eq!(pool.idle(), 0);

        let item = pool.checkout_with(|| 7);
        assert_eq!(*item, 7);
        assert_eq!(pool.idle(), 0);

        drop(item);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn returned_value_is_reused() {
        let pool = single_shard(4);
        {
            let mut item = pool.checkout_with(|| 0);
            *item = 42;
        }
        let item = pool.checkout_with(|| unreachable!("pool should hand back the idle value"));
        assert_eq!(*item, 42);
    }

    #[test]
    fn concurrent_checkouts_get_distinct_values() {
        let pool = single_shard(4);
        let a = pool.checkout_with(|| 1);
        let b = pool.checkout_with(|| 2);
        assert_eq!((*a, *b), (1, 2));
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn full_shard_drops_returned_values() {
        let pool = single_shard(1);
        let a = pool.checkout_with(|| 1);
        let b = pool.checkout_with(|| 2);
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn guard_mutation_survives_return_and_debug_shows_value() {
        let pool = single_shard(2);
        {
            let mut item = pool.checkout_with(|| 1);
            *item += 1;
            assert_eq!(format!("{item:?}"), "Pooled(2)");
        }
        assert_eq!(pool.idle(), 1);

        let item = pool.checkout_with(|| unreachable!("idle value should be reused"));
        assert_eq!(*item, 2);
        drop(item);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn zero_shards_is_clamped_to_one() {
        let pool: Pool<u8> = Pool::new(PoolConfig {
            shards: 0,
            capacity: 2,
        });
        assert_eq!(pool.shards(), 1);
        drop(pool.checkout_with(|| 0));
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn idle_count_is_bounded_under_contention() {
        let config = PoolConfig {
            shards: 2,
            capacity: 3,
        };
        let pool: Pool<u64> = Pool::new(config);

        scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for i in 0..1_000 {
                        let mut item = pool.checkout_with(|| 0);
                        *item += i;
                    }
                });
            }
        });

        assert!(pool.idle() <= config.shards * config.capacity);
        assert!(pool.idle() >= 1);
    }
}
