use core::fmt;

use super::url::encode_into;
use crate::{GUID_BASE64URL_SIZE, GUID_SIZE};

/// A stack-allocated Base64Url encoding of a guid.
///
/// Returned by [`crate::Guid::encode`]. Implements [`fmt::Display`] and
/// [`AsRef<str>`] so it can be written or compared without allocating.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base64UrlFormatter {
    buf: [u8; GUID_BASE64URL_SIZE],
}

impl Base64UrlFormatter {
    pub(crate) fn new(bytes: &[u8; GUID_SIZE]) -> Self {
        let mut buf = [0u8; GUID_BASE64URL_SIZE];
        encode_into(bytes, &mut buf);
        Self { buf }
    }

    /// Returns a `&str` view of the encoding.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: `self.buf` holds only Base64Url alphabet characters, which
        // are ASCII.
        unsafe { core::str::from_utf8_unchecked(&self.buf) }
    }

    /// Consumes the formatter and returns the raw ASCII buffer.
    #[must_use]
    pub const fn into_inner(self) -> [u8; GUID_BASE64URL_SIZE] {
        self.buf
    }
}

impl fmt::Display for Base64UrlFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Base64UrlFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl AsRef<str> for Base64UrlFormatter {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<[u8]> for Base64UrlFormatter {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl PartialEq<str> for Base64UrlFormatter {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Base64UrlFormatter {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<String> for Base64UrlFormatter {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == other.as_str()
    }
}

impl From<Base64UrlFormatter> for String {
    fn from(formatter: Base64UrlFormatter) -> Self {
        formatter.as_str().to_owned()
    }
}
