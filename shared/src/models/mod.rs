//! Remote table row models

pub mod menu;
pub mod order;
pub mod revenue;

pub use menu::{MenuCategory, MenuItem, MenuItemCreate, MenuItemUpdate};
pub use order::{LineItem, Order};
pub use revenue::RevenueRecord;
