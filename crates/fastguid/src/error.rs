use core::fmt;

use crate::{GUID_BASE64URL_SIZE, GUID_SIZE};

/// A result type defaulting to [`Error`].
///
/// Generation and random fills are infallible. Only the operations that accept
/// caller-provided bytes or buffers return this type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All recoverable errors that `fastguid` can produce.
///
/// Entropy failures are not represented here: an operating system that cannot
/// supply secure random bytes is treated as fatal and panics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The text is not exactly 22 characters long, or contains a character
    /// outside the Base64Url alphabet.
    InvalidEncoding {
        /// Length of the rejected input in bytes.
        len: usize,
    },

    /// A binary input held fewer than 16 bytes.
    TooShort {
        /// Length of the rejected input in bytes.
        len: usize,
    },

    /// The destination buffer cannot hold the 22-character text form.
    BufferTooSmall {
        /// Length of the destination buffer in bytes.
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding { len } => write!(
                f,
                "invalid Base64Url guid encoding of {len} bytes (invalid characters, or length != {GUID_BASE64URL_SIZE})"
            ),
            Self::TooShort { len } => {
                write!(f, "invalid guid slice (length {len} < {GUID_SIZE} bytes)")
            }
            Self::BufferTooSmall { len } => write!(
                f,
                "buffer is too small (length {len} < {GUID_BASE64URL_SIZE} bytes)"
            ),
        }
    }
}

impl core::error::Error for Error {}
