//! Line-item codec for the `orders.iteminfo` column
//!
//! The upstream ordering flow stores the item list as a JSON-encoded string,
//! and depending on the writer the payload arrives either already decoded,
//! encoded once, or encoded twice. Decoding is deliberately fail-soft: a
//! payload that cannot be understood yields an empty list, never an error.
//! The worst outcome of a bad row is an order card with no items on it.

use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

use crate::models::LineItem;

/// Decode a semi-structured `iteminfo` payload into typed line items.
///
/// Accepts an array value, a JSON string, or a double-encoded JSON string.
/// Array elements that are not objects are dropped; object fields that are
/// missing or mistyped fall back to their defaults.
pub fn decode_line_items(value: &Value) -> Vec<LineItem> {
    let unwrapped = match value {
        Value::Array(_) => value.clone(),
        Value::String(s) => match unwrap_encoded(s) {
            Some(v) => v,
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    match unwrapped {
        Value::Array(elements) => elements
            .into_iter()
            .filter_map(|el| serde_json::from_value::<LineItem>(el).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse a JSON string, following one more level of string encoding if the
/// first parse yields another string.
fn unwrap_encoded(s: &str) -> Option<Value> {
    let first: Value = serde_json::from_str(s).ok()?;
    match first {
        Value::String(inner) => serde_json::from_str(&inner).ok(),
        other => Some(other),
    }
}

/// Serde adapter: deserialize an `iteminfo` field through the codec.
pub fn deserialize_line_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_line_items(&value))
}

/// Serde adapter: serialize line items back to the wire encoding (a JSON
/// string), matching what the upstream writer produces.
pub fn serialize_line_items<S>(items: &[LineItem], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let encoded = serde_json::to_string(items).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&encoded)
}
