//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec;

/// One line on an order, as stored inside `orders.iteminfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Unit price in whole currency units
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub quantity: i64,
}

impl LineItem {
    /// Line subtotal (unit price × quantity)
    pub fn subtotal(&self) -> i64 {
        self.price * self.quantity
    }
}

/// Order entity, mirroring a row of the remote `orders` table
///
/// Orders are created by the upstream ordering flow; this component only
/// ever flips the two completion flags. The flags are monotone here: once
/// true they are never reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tableno: i64,
    #[serde(default)]
    pub payment_done: bool,
    #[serde(default)]
    pub order_done: bool,
    /// Line items, carried on the wire as the encoded `iteminfo` column
    #[serde(
        rename = "iteminfo",
        default,
        deserialize_with = "codec::deserialize_line_items",
        serialize_with = "codec::serialize_line_items"
    )]
    pub items: Vec<LineItem>,
}

impl Order {
    /// Order total (sum of line subtotals)
    pub fn total(&self) -> i64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Both flags set: the order leaves the active view
    pub fn is_completed(&self) -> bool {
        self.payment_done && self.order_done
    }
}
