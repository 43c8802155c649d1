//! Request body helpers shared by the resource payloads

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Deserialize an optional field, treating `null` and `""` as absent.
///
/// Create bodies use this so that a blank required field fails the presence
/// check the same way a missing one does, and a blank optional field is stored
/// as NULL. A string holding a number (`"5"`) is accepted for numeric fields.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(value) => match T::deserialize(&value) {
            Ok(v) => Ok(Some(v)),
            // Form bodies carry every value as text
            Err(e) => match &value {
                Value::String(s) => serde_json::from_str(s).map(Some).map_err(|_| de::Error::custom(e)),
                _ => Err(de::Error::custom(e)),
            },
        },
    }
}

/// Parse a request body. An empty body is treated as `{}`.
pub fn parse_body<T>(body: &[u8]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
}

/// Parse an `application/x-www-form-urlencoded` body. An empty body is treated as `{}`.
pub fn parse_form<T>(body: &[u8]) -> Result<T, serde_urlencoded::de::Error>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_urlencoded::from_bytes(body)
}
