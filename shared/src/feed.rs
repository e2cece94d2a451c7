//! Change-feed event types
//!
//! The hosted backend pushes one event per committed row change. Events are
//! tagged with the table, the kind of change, and the new/old row as raw
//! JSON; typed access goes through the fail-closed decoders below.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote table names
pub mod tables {
    pub const ORDERS: &str = "orders";
    pub const MENU: &str = "menu";
    pub const ANALYSIS: &str = "analysis";
}

/// Kind of row change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "INSERT"),
            ChangeKind::Update => write!(f, "UPDATE"),
            ChangeKind::Delete => write!(f, "DELETE"),
        }
    }
}

/// One change delivered by the push subscription
///
/// `new` carries the row after the change (insert/update), `old` the row
/// before it (update/delete). Delete events may carry only the key columns
/// in `old`, which is why [`ChangeEvent::old_id`] exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    #[serde(rename = "eventType")]
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
}

impl ChangeEvent {
    pub fn insert(table: impl Into<String>, new: Value) -> Self {
        Self {
            table: table.into(),
            kind: ChangeKind::Insert,
            new: Some(new),
            old: None,
        }
    }

    pub fn update(table: impl Into<String>, new: Value) -> Self {
        Self {
            table: table.into(),
            kind: ChangeKind::Update,
            new: Some(new),
            old: None,
        }
    }

    pub fn delete(table: impl Into<String>, old: Value) -> Self {
        Self {
            table: table.into(),
            kind: ChangeKind::Delete,
            new: None,
            old: Some(old),
        }
    }

    /// Decode the new row. Fails closed: any decode problem yields `None`.
    pub fn new_row<T: DeserializeOwned>(&self) -> Option<T> {
        let value = self.new.as_ref()?;
        match serde_json::from_value(value.clone()) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::debug!(table = %self.table, kind = %self.kind, error = %e,
                    "undecodable new row in change event");
                None
            }
        }
    }

    /// Decode the old row. Fails closed like [`ChangeEvent::new_row`].
    pub fn old_row<T: DeserializeOwned>(&self) -> Option<T> {
        let value = self.old.as_ref()?;
        match serde_json::from_value(value.clone()) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::debug!(table = %self.table, kind = %self.kind, error = %e,
                    "undecodable old row in change event");
                None
            }
        }
    }

    /// Id of the deleted/previous row, tolerating key-only `old` payloads.
    pub fn old_id(&self) -> Option<i64> {
        self.old.as_ref()?.get("id")?.as_i64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MenuItem;
    use serde_json::json;

    #[test]
    fn kind_uses_uppercase_wire_strings() {
        assert_eq!(serde_json::to_string(&ChangeKind::Insert).unwrap(), "\"INSERT\"");
        let kind: ChangeKind = serde_json::from_str("\"DELETE\"").unwrap();
        assert_eq!(kind, ChangeKind::Delete);
    }

    #[test]
    fn typed_decode_fails_closed() {
        let event = ChangeEvent::insert(tables::MENU, json!({ "id": "not a number" }));
        assert!(event.new_row::<MenuItem>().is_none());
    }

    #[test]
    fn old_id_reads_key_only_payloads() {
        let event = ChangeEvent::delete(tables::MENU, json!({ "id": 42 }));
        assert_eq!(event.old_id(), Some(42));

        let event = ChangeEvent::delete(tables::MENU, json!({}));
        assert_eq!(event.old_id(), None);
    }

    #[test]
    fn event_wire_shape_matches_subscription_payload() {
        let raw = json!({
            "table": "menu",
            "eventType": "UPDATE",
            "new": { "id": 1, "name": "Chai", "price": 25, "category": "Beverages" },
            "old": { "id": 1 }
        });
        let event: ChangeEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.kind, ChangeKind::Update);
        let item: MenuItem = event.new_row().unwrap();
        assert_eq!(item.price, 25);
    }
}
