//! Shared types for the back-office dashboard
//!
//! Wire-level row models for the remote tables, the tolerant line-item
//! codec, and the change-feed event types consumed by the live mirrors.

pub mod codec;
pub mod feed;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Change feed re-exports (for convenient access)
pub use feed::{ChangeEvent, ChangeKind};

// Model re-exports
pub use models::{
    LineItem, MenuCategory, MenuItem, MenuItemCreate, MenuItemUpdate, Order, RevenueRecord,
};
