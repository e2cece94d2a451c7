//! Revenue Record Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the remote `analysis` table: accumulated revenue for a
/// calendar day. The table holds at most one row per date; same-day writes
/// increment the amount rather than overwrite it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    /// Business date (YYYY-MM-DD)
    pub date: NaiveDate,
    #[serde(default)]
    pub amount: f64,
}

impl RevenueRecord {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}
