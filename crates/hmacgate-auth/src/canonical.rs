//! Canonical message construction.
//!
//! Signer and verifier must hash byte-identical input, so the request body is
//! reduced to a canonical JSON form before signing:
//!
//! ```text
//! {"a":1,"b":[true,null,"x"],"c":{"d":2.5}}
//! ```
//!
//! - object keys are sorted by their UTF-8 bytes, at every depth
//! - no insignificant whitespace; separators are `,` and `:`
//! - strings use standard JSON escaping
//! - numbers keep the exact text they were written with
//! - array order is preserved
//! - an empty body is the empty object `{}`
//!
//! A body with an object that repeats a key has no canonical form and is
//! rejected.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value;

use crate::error::AuthError;

/// Canonical message used for an empty request body.
pub const EMPTY_BODY_MESSAGE: &[u8] = b"{}";

/// Produce the canonical byte form of a JSON value.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::canonical::canonicalize_value;
///
/// let value = serde_json::json!({"b": 1, "a": [1, 2]});
/// assert_eq!(canonicalize_value(&value), br#"{"a":[1,2],"b":1}"#);
/// ```
#[must_use]
pub fn canonicalize_value(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(&mut out, value);
    out
}

/// Produce the canonical message for a raw request body.
///
/// # Errors
///
/// Returns [`AuthError::Encoding`] if the body is not valid JSON or an object
/// in it repeats a key.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::canonical::canonicalize_body;
///
/// let message = canonicalize_body(br#"{ "foo" : "bar" }"#).unwrap();
/// assert_eq!(message, br#"{"foo":"bar"}"#);
/// assert_eq!(canonicalize_body(b"").unwrap(), b"{}");
/// ```
pub fn canonicalize_body(body: &[u8]) -> Result<Vec<u8>, AuthError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EMPTY_BODY_MESSAGE.to_vec());
    }
    serde_json::from_slice::<UniqueKeys>(body)?;
    let value: Value = serde_json::from_slice(body)?;
    Ok(canonicalize_value(&value))
}

/// Produce the canonical message for any serializable payload.
///
/// # Errors
///
/// Returns [`AuthError::Encoding`] if the value cannot be represented as JSON,
/// for example a map with non-string keys.
pub fn canonicalize_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, AuthError> {
    let value = serde_json::to_value(value)?;
    Ok(canonicalize_value(&value))
}

/// Walks a JSON document, failing on the first object that repeats a key.
struct UniqueKeys;

impl<'de> Deserialize<'de> for UniqueKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UniqueKeysVisitor)
    }
}

struct UniqueKeysVisitor;

impl<'de> Visitor<'de> for UniqueKeysVisitor {
    type Value = UniqueKeys;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_unit<E: de::Error>(self) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<UniqueKeys, A::Error> {
        while seq.next_element::<UniqueKeys>()?.is_some() {}
        Ok(UniqueKeys)
    }

    // Precise numbers also arrive here, as a single-entry map holding their text.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<UniqueKeys, A::Error> {
        let mut seen = HashSet::new();
        while let Some(key) = map.next_key::<String>()? {
            map.next_value::<UniqueKeys>()?;
            if !seen.insert(key) {
                return Err(de::Error::custom("object has a duplicate key"));
            }
        }
        Ok(UniqueKeys)
    }
}

fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(out, key);
                out.push(b':');
                write_value(out, item);
            }
            out.push(b'}');
        }
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    serde_json::to_writer(&mut *out, s).expect("writing a JSON string into a Vec cannot fail");
}
