use core::{fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
};

use crate::{GUID_SIZE, Guid, GuidPg, GuidSs};

/// Human-readable formats get the 22-character text, binary formats the raw
/// 16 bytes.
impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.serialize_str(self.encode().as_str())
        } else {
            s.serialize_bytes(self.as_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        if d.is_human_readable() {
            d.deserialize_str(GuidVisitor)
        } else {
            d.deserialize_bytes(GuidVisitor)
        }
    }
}

struct GuidVisitor;

impl<'de> Visitor<'de> for GuidVisitor {
    type Value = Guid;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a 22-character Base64Url string or 16 bytes")
    }

    #[inline]
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Guid::parse(v).map_err(de::Error::custom)
    }

    #[inline]
    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        let Ok(bytes) = <[u8; GUID_SIZE]>::try_from(v) else {
            return Err(de::Error::invalid_length(v.len(), &self));
        };
        Ok(Guid::from_bytes(bytes))
    }

    // Formats without a native byte type hand bytes over as a sequence.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut bytes = [0u8; GUID_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        if seq.next_element::<u8>()?.is_some() {
            return Err(de::Error::invalid_length(GUID_SIZE + 1, &self));
        }
        Ok(Guid::from_bytes(bytes))
    }
}

macro_rules! impl_serde_sortable {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                self.guid().serialize(s)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                Guid::deserialize(d).map($ty::from_guid)
            }
        }
    };
}

impl_serde_sortable!(GuidPg);
impl_serde_sortable!(GuidSs);

/// Always serializes as Base64Url text, even in binary formats.
///
/// ```
/// use fastguid::Guid;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde(with = "fastguid::as_base64url")]
///     id: Guid,
/// }
/// ```
pub mod as_base64url {
    use super::*;

    pub fn serialize<ID, S>(id: &ID, s: S) -> Result<S::Ok, S::Error>
    where
        ID: AsRef<[u8; GUID_SIZE]>,
        S: Serializer,
    {
        s.serialize_str(Guid::from_bytes(*id.as_ref()).encode().as_str())
    }

    pub fn deserialize<'de, ID, D>(d: D) -> Result<ID, D::Error>
    where
        ID: From<Guid>,
        D: Deserializer<'de>,
    {
        struct TextVisitor<ID>(PhantomData<ID>);

        impl<ID: From<Guid>> Visitor<'_> for TextVisitor<ID> {
            type Value = ID;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 22-character Base64Url string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Guid::parse(v).map(ID::from).map_err(de::Error::custom)
            }
        }

        d.deserialize_str(TextVisitor(PhantomData))
    }
}
