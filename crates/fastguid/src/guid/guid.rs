use core::{fmt, str::FromStr};

use crate::{
    Base64UrlFormatter, Error, Result,
    base64::{decode_into, encode_into},
    reader,
};

/// Size of a [`Guid`] in bytes.
pub const GUID_SIZE: usize = 16;

/// Length of the Base64Url text form of a [`Guid`].
pub const GUID_BASE64URL_SIZE: usize = 22;

/// A 128-bit cryptographically random identifier.
///
/// Equality and ordering are byte-wise. The text form is 22 Base64Url
/// characters with no padding.
///
/// # Example
/// ```
/// use fastguid::Guid;
///
/// let id = Guid::new();
/// let text = id.to_string();
/// assert_eq!(text.len(), 22);
/// assert_eq!(Guid::parse(&text).unwrap(), id);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Guid([u8; GUID_SIZE]);

impl Guid {
    /// The nil guid, all 128 bits zero.
    pub const NIL: Self = Self([0; GUID_SIZE]);

    /// The maximum guid, all 128 bits one.
    pub const MAX: Self = Self([0xFF; GUID_SIZE]);

    /// Generates a new guid from the process-wide pooled secure reader.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        reader::next_guid()
    }

    /// Generates a new guid and returns its Base64Url text.
    #[must_use]
    pub fn new_string() -> String {
        Self::new().encode().into()
    }

    /// Wraps 16 raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; GUID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copies the first 16 bytes of `src`. Trailing bytes are ignored.
    ///
    /// This is the checked constructor for raw bytes of unknown length, such
    /// as a database column or a network frame. Use [`Guid::from_bytes`] when
    /// the bytes are already a `[u8; 16]`. Also reachable as
    /// `Guid::try_from(&[u8])`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooShort`] if `src` holds fewer than 16 bytes.
    ///
    /// # Example
    /// ```
    /// use fastguid::{Error, Guid};
    ///
    /// let column = [0xAB_u8; 20];
    /// assert_eq!(Guid::from_slice(&column).unwrap(), Guid::from_bytes([0xAB; 16]));
    /// assert_eq!(Guid::from_slice(&column[..4]), Err(Error::TooShort { len: 4 }));
    /// ```
    pub fn from_slice(src: &[u8]) -> Result<Self> {
        match src.first_chunk::<GUID_SIZE>() {
            Some(bytes) => Ok(Self(*bytes)),
            None => Err(Error::TooShort { len: src.len() }),
        }
    }

    /// Builds a guid from a big-endian 128-bit integer.
    #[must_use]
    pub const fn from_u128(raw: u128) -> Self {
        Self(raw.to_be_bytes())
    }

    /// The guid as a big-endian 128-bit integer.
    #[must_use]
    pub const fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; GUID_SIZE] {
        &self.0
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; GUID_SIZE] {
        self.0
    }

    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.to_u128() == 0
    }

    /// Parses the 22-character Base64Url form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if `s` is not exactly 22 characters
    /// or contains a character outside the alphabet. Padding (`=`) is never
    /// accepted.
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_bytes(s.as_bytes())
    }

    /// Parses the 22-byte Base64Url form from raw ASCII bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Guid::parse`].
    pub fn parse_bytes(src: &[u8]) -> Result<Self> {
        let invalid = Error::InvalidEncoding { len: src.len() };
        let Ok(src) = <&[u8; GUID_BASE64URL_SIZE]>::try_from(src) else {
            return Err(invalid);
        };
        let mut bytes = [0u8; GUID_SIZE];
        if decode_into(&mut bytes, src) {
            Ok(Self(bytes))
        } else {
            Err(invalid)
        }
    }

    /// Returns a stack-allocated Base64Url formatter for this guid.
    pub fn encode(&self) -> Base64UrlFormatter {
        Base64UrlFormatter::new(&self.0)
    }

    /// Encodes into a caller-supplied buffer and returns a view of it.
    pub fn encode_to_buf<'buf>(&self, buf: &'buf mut [u8; GUID_BASE64URL_SIZE]) -> &'buf str {
        encode_into(&self.0, buf);
        // SAFETY: `encode_into` writes only Base64Url alphabet characters.
        unsafe { core::str::from_utf8_unchecked(buf) }
    }
}

/// Generates a new guid from the process-wide pooled secure reader.
#[must_use]
#[inline]
pub fn new_guid() -> Guid {
    Guid::new()
}

/// Generates a new guid and returns its Base64Url text.
#[must_use]
pub fn new_string() -> String {
    Guid::new_string()
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode().as_str())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guid").field(&self.encode().as_str()).finish()
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&[u8]> for Guid {
    type Error = Error;

    fn try_from(src: &[u8]) -> Result<Self> {
        Self::from_slice(src)
    }
}

impl From<[u8; GUID_SIZE]> for Guid {
    fn from(bytes: [u8; GUID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<Guid> for [u8; GUID_SIZE] {
    fn from(guid: Guid) -> Self {
        guid.0
    }
}

impl AsRef<[u8; GUID_SIZE]> for Guid {
    fn as_ref(&self) -> &[u8; GUID_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Guid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
