use core::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{GUID_SIZE, Guid, MonotonicClock, TimeSource};

const LOW_64: u128 = u64::MAX as u128;

/// Rotation that moves the most significant 48 timestamp bits into the bytes
/// SQL Server compares first.
const SS_ROTATION: u32 = 16;

/// A guid whose leading 8 bytes are a big-endian nanosecond timestamp, so that
/// byte-wise ordering (as PostgreSQL `uuid` and most key-value stores use)
/// follows creation time.
///
/// The remaining 8 bytes are cryptographically random.
///
/// # Example
/// ```
/// use fastguid::GuidPg;
///
/// let a = GuidPg::new(1_000);
/// let b = GuidPg::new(2_000);
/// assert!(a < b);
/// assert_eq!(a.timestamp(), 1_000);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct GuidPg(Guid);

impl GuidPg {
    /// Builds an identifier carrying `timestamp` nanoseconds since the Unix
    /// epoch.
    #[must_use]
    pub fn new(timestamp: u64) -> Self {
        let random = Guid::new().to_u128() & LOW_64;
        Self(Guid::from_u128((u128::from(timestamp) << 64) | random))
    }

    /// Builds an identifier stamped with the process-wide monotonic clock.
    #[must_use]
    pub fn now() -> Self {
        Self::with_clock(MonotonicClock::global())
    }

    /// Builds an identifier stamped with `clock`.
    #[must_use]
    pub fn with_clock<T: TimeSource<u64>>(clock: &T) -> Self {
        Self::new(clock.current_nanos())
    }

    /// Reinterprets any guid in the PostgreSQL layout.
    #[must_use]
    pub const fn from_guid(guid: Guid) -> Self {
        Self(guid)
    }

    #[must_use]
    pub const fn guid(&self) -> Guid {
        self.0
    }

    /// Nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        (self.0.to_u128() >> 64) as u64
    }

    #[must_use]
    pub fn system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.timestamp())
    }
}

/// A guid laid out for SQL Server `uniqueidentifier` ordering.
///
/// SQL Server compares bytes 10..16 first, then 8..10, then the rest. The
/// timestamp is rotated right by 16 bits and stored big-endian in bytes 8..16,
/// so its high 48 bits land in 10..16 and its low 16 bits in 8..10. Bytes
/// 0..8 are cryptographically random.
///
/// ```
/// use fastguid::GuidSs;
///
/// let id = GuidSs::new(0x1122_3344_5566_7788);
/// assert_eq!(id.guid().as_bytes()[8..], [0x77, 0x88, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
/// assert_eq!(id.timestamp(), 0x1122_3344_5566_7788);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct GuidSs(Guid);

impl GuidSs {
    /// Builds an identifier carrying `timestamp` nanoseconds since the Unix
    /// epoch.
    #[must_use]
    pub fn new(timestamp: u64) -> Self {
        let random = Guid::new().to_u128() & !LOW_64;
        let stamp = u128::from(timestamp.rotate_right(SS_ROTATION));
        Self(Guid::from_u128(random | stamp))
    }

    /// Builds an identifier stamped with the process-wide monotonic clock.
    #[must_use]
    pub fn now() -> Self {
        Self::with_clock(MonotonicClock::global())
    }

    /// Builds an identifier stamped with `clock`.
    #[must_use]
    pub fn with_clock<T: TimeSource<u64>>(clock: &T) -> Self {
        Self::new(clock.current_nanos())
    }

    /// Reinterprets any guid in the SQL Server layout.
    #[must_use]
    pub const fn from_guid(guid: Guid) -> Self {
        Self(guid)
    }

    #[must_use]
    pub const fn guid(&self) -> Guid {
        self.0
    }

    /// Nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        ((self.0.to_u128() & LOW_64) as u64).rotate_left(SS_ROTATION)
    }

    #[must_use]
    pub fn system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.timestamp())
    }
}

macro_rules! impl_sortable {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("guid", &self.0.encode().as_str())
                    .field("timestamp", &self.timestamp())
                    .finish()
            }
        }

        impl From<Guid> for $ty {
            fn from(guid: Guid) -> Self {
                Self(guid)
            }
        }

        impl From<$ty> for Guid {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl AsRef<Guid> for $ty {
            fn as_ref(&self) -> &Guid {
                &self.0
            }
        }

        impl AsRef<[u8; GUID_SIZE]> for $ty {
            fn as_ref(&self) -> &[u8; GUID_SIZE] {
                self.0.as_bytes()
            }
        }
    };
}

impl_sortable!(GuidPg);
impl_sortable!(GuidSs);
