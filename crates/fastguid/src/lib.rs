//! Fast 128-bit random identifiers and pooled secure random bytes.
//!
//! [`Guid::new`] draws 16 bytes from a pool of 4 KiB caches filled by the
//! operating system RNG, so most calls cost an uncontended checkout
//! and a copy. [`GuidPg`] and [`GuidSs`] embed a nanosecond timestamp for
//! databases that index by byte order. [`fill`] and [`fill_lite`] expose the
//! same machinery as general purpose random byte sources.
//!
//! ```
//! use fastguid::{Guid, GuidPg};
//!
//! let id = Guid::new();
//! assert_eq!(id.to_string().parse::<Guid>().unwrap(), id);
//!
//! let a = GuidPg::now();
//! let b = GuidPg::now();
//! assert!(a.timestamp() <= b.timestamp());
//! ```

mod base64;
mod entropy;
mod error;
mod guid;
#[cfg(feature = "lite")]
mod lite;
mod mutex;
mod pool;
mod reader;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::base64::*;
pub use crate::entropy::*;
pub use crate::error::*;
pub use crate::guid::*;
#[cfg(feature = "lite")]
pub use crate::lite::*;
pub use crate::pool::*;
pub use crate::reader::*;
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::time::*;
