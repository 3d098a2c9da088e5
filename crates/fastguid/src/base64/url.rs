use crate::{Error, GUID_BASE64URL_SIZE, GUID_SIZE, Result};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const NO_VALUE: u8 = 0xFF;

/// Whole 3-byte groups in a guid; the 16th byte is handled on its own.
const GROUPED_BYTES: usize = GUID_SIZE - GUID_SIZE % 3;

/// Lookup table for Base64Url decoding. Bytes outside the alphabet map to
/// `NO_VALUE`.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < 64 {
        lut[ALPHABET[i as usize] as usize] = i;
        i += 1;
    }
    lut
};

/// Encodes the first 16 bytes of `src` as 22 Base64Url characters into the
/// first 22 bytes of `dst`.
///
/// The last character carries only the low 2 bits of byte 16; its low 4 bits
/// are always zero.
///
/// # Errors
///
/// Returns [`Error::BufferTooSmall`] if `dst` is shorter than 22 bytes. Nothing
/// is written in that case.
///
/// # Example
/// ```
/// use fastguid::{Guid, encode_base64url};
///
/// let mut buf = [0u8; 22];
/// encode_base64url(&Guid::MAX, &mut buf).unwrap();
/// assert_eq!(&buf, b"_____________________w");
///
/// assert!(encode_base64url(&Guid::MAX, &mut [0u8; 21]).is_err());
/// ```
pub fn encode_base64url(src: &impl AsRef<[u8; GUID_SIZE]>, dst: &mut [u8]) -> Result<()> {
    let len = dst.len();
    let Some(dst) = dst.first_chunk_mut::<GUID_BASE64URL_SIZE>() else {
        return Err(Error::BufferTooSmall { len });
    };
    encode_into(src.as_ref(), dst);
    Ok(())
}

/// Fixed-size encoder behind [`encode_base64url`] and the formatters.
#[inline]
pub(crate) fn encode_into(src: &[u8; GUID_SIZE], dst: &mut [u8; GUID_BASE64URL_SIZE]) {
    let mut j = 0;
    let mut i = 0;
    while i < GROUPED_BYTES {
        let val = (u32::from(src[i]) << 16) | (u32::from(src[i + 1]) << 8) | u32::from(src[i + 2]);
        dst[j] = ALPHABET[((val >> 18) & 0x3F) as usize];
        dst[j + 1] = ALPHABET[((val >> 12) & 0x3F) as usize];
        dst[j + 2] = ALPHABET[((val >> 6) & 0x3F) as usize];
        dst[j + 3] = ALPHABET[(val & 0x3F) as usize];
        i += 3;
        j += 4;
    }

    let last = src[GROUPED_BYTES];
    dst[j] = ALPHABET[(last >> 2) as usize];
    dst[j + 1] = ALPHABET[((last & 0x03) << 4) as usize];
}

/// Decodes the first 22 bytes of `src` into the first 16 bytes of `dst`.
///
/// Returns `false` if `dst` is shorter than 16 bytes, `src` is shorter than 22
/// bytes, or any of the 22 characters is outside the alphabet. Longer buffers
/// are accepted; only the prefixes are touched.
///
/// On `false`, `dst` may already hold partially decoded bytes and must be
/// discarded.
///
/// The low 4 bits of the final character are not checked, so strings that
/// differ only there decode to the same guid.
///
/// # Example
/// ```
/// use fastguid::decode_base64url;
///
/// let mut guid = [0u8; 16];
/// assert!(decode_base64url(&mut guid, b"_____________________w"));
/// assert_eq!(guid, [0xFF; 16]);
///
/// assert!(!decode_base64url(&mut guid, b"____________________=="));
/// ```
#[must_use]
pub fn decode_base64url(dst: &mut [u8], src: &[u8]) -> bool {
    let (Some(dst), Some(src)) = (
        dst.first_chunk_mut::<GUID_SIZE>(),
        src.first_chunk::<GUID_BASE64URL_SIZE>(),
    ) else {
        return false;
    };
    decode_into(dst, src)
}

#[inline]
pub(crate) fn decode_into(dst: &mut [u8; GUID_SIZE], src: &[u8; GUID_BASE64URL_SIZE]) -> bool {
    let mut i = 0;
    let mut j = 0;
    while i < GROUPED_BYTES {
        let b0 = LOOKUP[src[j] as usize];
        let b1 = LOOKUP[src[j + 1] as usize];
        let b2 = LOOKUP[src[j + 2] as usize];
        let b3 = LOOKUP[src[j + 3] as usize];

        // Valid values are < 64; NO_VALUE sets the top bits.
        if (b0 | b1 | b2 | b3) >= 64 {
            return false;
        }

        dst[i] = (b0 << 2) | (b1 >> 4);
        dst[i + 1] = (b1 << 4) | (b2 >> 2);
        dst[i + 2] = (b2 << 6) | b3;
        i += 3;
        j += 4;
    }

    let b0 = LOOKUP[src[j] as usize];
    let b1 = LOOKUP[src[j + 1] as usize];
    if (b0 | b1) >= 64 {
        return false;
    }
    dst[GROUPED_BYTES] = (b0 << 2) | (b1 >> 4);
    true
}
