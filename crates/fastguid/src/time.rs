use std::{
    sync::LazyLock,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// A source of timestamps in nanoseconds since the Unix epoch.
///
/// Sortable guids read one timestamp per construction. Implement this to pin
/// the clock in tests or to share a coarser clock across a service.
///
/// # Example
///
/// ```
/// use fastguid::{GuidPg, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_nanos(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(GuidPg::with_clock(&FixedTime).timestamp(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in nanoseconds since the Unix epoch.
    fn current_nanos(&self) -> T;
}

/// A wall-clock aligned time source that never goes backward.
///
/// The wall clock is read once at construction. Later readings add the
/// monotonic time elapsed since then, so NTP steps and manual clock changes
/// do not reorder identifiers created by one process.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch_offset: u64, // nanoseconds since UNIX_EPOCH at `start`
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Anchors a new clock at the current wall-clock time.
    ///
    /// A system clock set before 1970 anchors at zero.
    #[must_use]
    pub fn new() -> Self {
        let start = Instant::now();
        let epoch_offset = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, saturating_nanos);
        Self {
            start,
            epoch_offset,
        }
    }

    /// The process-wide clock, anchored on first use.
    pub fn global() -> &'static Self {
        static GLOBAL: LazyLock<MonotonicClock> = LazyLock::new(MonotonicClock::new);
        &GLOBAL
    }
}

impl TimeSource<u64> for MonotonicClock {
    fn current_nanos(&self) -> u64 {
        self.epoch_offset
            .saturating_add(saturating_nanos(self.start.elapsed()))
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
