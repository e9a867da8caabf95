//! Serde helpers for invocation payloads.
//!
//! Byte fields travel as base64 strings, the encoding the function runtimes
//! emit. Replies from hand-written functions often carry plain text or
//! `null` instead, so decoding is lenient.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::Serializer;

/// `#[serde(with = "base64_bytes")]` for [`Bytes`] fields.
pub mod base64_bytes {
    use super::*;

    pub fn serialize<S>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    /// Accepts a base64 string, any other string (taken as UTF-8 bytes),
    /// an array of byte values, or `null`.
    ///
    /// Text that happens to be valid base64 (`"test"`, `"done"`) is decoded,
    /// so functions must base64-encode text bodies to get them back intact.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct V;

        impl<'de> Visitor<'de> for V {
            type Value = Bytes;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a base64 string, a string, an array of bytes or null")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match STANDARD.decode(v) {
                    Ok(decoded) => Ok(Bytes::from(decoded)),
                    Err(_) => Ok(Bytes::copy_from_slice(v.as_bytes())),
                }
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Bytes::copy_from_slice(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(byte) = seq.next_element::<u8>()? {
                    out.push(byte);
                }
                Ok(Bytes::from(out))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Bytes::new())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Bytes::new())
            }
        }

        deserializer.deserialize_any(V)
    }
}

/// Deserialize `null` as `T::default()`.
pub fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct T {
        #[serde(default, with = "base64_bytes")]
        data: Bytes,
    }

    fn decode(json: &str) -> Bytes {
        serde_json::from_str::<T>(json).unwrap().data
    }

    #[test]
    fn encodes_as_base64() {
        let t = T {
            data: Bytes::from_static(b"hello"),
        };
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"{"data":"aGVsbG8="}"#);
    }

    #[test]
    fn decodes_base64_and_plain_strings() {
        assert_eq!(&decode(r#"{"data":"aGVsbG8="}"#)[..], b"hello");
        assert_eq!(&decode(r#"{"data":"hi"}"#)[..], b"hi");
        assert_eq!(&decode(r#"{"data":"not base64!"}"#)[..], b"not base64!");
    }

    #[test]
    fn base64_shaped_text_is_decoded() {
        assert_eq!(&decode(r#"{"data":"done"}"#)[..], &[0x76, 0x89, 0xde]);
        assert_eq!(&decode(r#"{"data":"dGVzdA=="}"#)[..], b"test");
    }

    #[test]
    fn decodes_byte_arrays_and_null() {
        assert_eq!(&decode(r#"{"data":[104,105]}"#)[..], b"hi");
        assert!(decode(r#"{"data":null}"#).is_empty());
        assert!(decode(r#"{}"#).is_empty());
        assert!(decode(r#"{"data":""}"#).is_empty());
    }

    #[test]
    fn rejects_other_types() {
        assert!(serde_json::from_str::<T>(r#"{"data":12}"#).is_err());
        assert!(serde_json::from_str::<T>(r#"{"data":[300]}"#).is_err());
    }
}
