//! Daily revenue recorder
//!
//! Mirrors the `analysis` table, one row per calendar day, and posts
//! revenue against today's row. The backend folds the amount into the
//! existing daily total in a single statement, so two dashboards posting
//! at the same moment both land.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use chrono_tz::Tz;
use hub_client::TableClient;
use shared::feed::{ChangeEvent, ChangeKind};
use shared::models::RevenueRecord;

use crate::core::{AppError, AppResult};

pub struct RevenueService {
    client: Arc<dyn TableClient>,
    /// Daily totals are bucketed in the restaurant's local calendar
    tz: Tz,
    records: Mutex<Vec<RevenueRecord>>,
}

impl RevenueService {
    pub fn new(client: Arc<dyn TableClient>, tz: Tz) -> Self {
        Self {
            client,
            tz,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Seed the mirror from a full fetch
    pub async fn refresh(&self) -> AppResult<()> {
        let rows = self.client.fetch_revenue().await?;
        *self.records.lock().unwrap() = rows;
        Ok(())
    }

    /// Today's date in the business timezone
    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.tz).date_naive()
    }

    pub fn records(&self) -> Vec<RevenueRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Post an amount against today's daily total
    pub async fn record(&self, amount: f64) -> AppResult<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::validation("amount must be a positive number"));
        }
        self.client.record_revenue(self.today(), amount).await?;
        Ok(())
    }

    /// Apply one change-feed event for the analysis table.
    ///
    /// Rows are keyed by date; an insert for a date already mirrored
    /// replaces that day's row.
    pub fn apply(&self, event: &ChangeEvent) {
        let mut records = self.records.lock().unwrap();
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                let Some(row) = event.new_row::<RevenueRecord>() else {
                    return;
                };
                match records.iter_mut().find(|r| r.date == row.date) {
                    Some(existing) => *existing = row,
                    None => records.push(row),
                }
            }
            ChangeKind::Delete => {
                if let Some(row) = event.old_row::<RevenueRecord>() {
                    records.retain(|r| r.date != row.date);
                }
            }
        }
    }
}
