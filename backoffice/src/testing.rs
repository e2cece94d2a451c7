//! Test doubles shared by the service test modules

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use hub_client::{ClientError, ClientResult, TableClient};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, Order, RevenueRecord};
use tokio::sync::Notify;

/// In-memory [`TableClient`] that records every call it receives.
///
/// Writes can be held open on a [`Notify`] to exercise in-flight guards,
/// or forced to fail to exercise error surfacing.
#[derive(Default)]
pub struct MockTableClient {
    pub orders: Mutex<Vec<Order>>,
    pub menu: Mutex<Vec<MenuItem>>,
    pub revenue: Mutex<Vec<RevenueRecord>>,
    calls: Mutex<Vec<String>>,
    hold_writes: Mutex<Option<Arc<Notify>>>,
    fail_writes: Mutex<bool>,
}

impl MockTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, as "name(args)" labels in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("fetch_"))
            .collect()
    }

    /// Block every write until the returned handle is notified
    pub fn hold_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold_writes.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    async fn write_barrier(&self) -> ClientResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(ClientError::Internal("write failed".to_string()));
        }
        let gate = self.hold_writes.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(())
    }
}

#[async_trait]
impl TableClient for MockTableClient {
    async fn fetch_orders(&self) -> ClientResult<Vec<Order>> {
        self.record("fetch_orders");
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn mark_payment_done(&self, id: i64) -> ClientResult<()> {
        self.record(format!("mark_payment_done({id})"));
        self.write_barrier().await
    }

    async fn mark_order_done(&self, id: i64) -> ClientResult<()> {
        self.record(format!("mark_order_done({id})"));
        self.write_barrier().await
    }

    async fn fetch_menu(&self) -> ClientResult<Vec<MenuItem>> {
        self.record("fetch_menu");
        Ok(self.menu.lock().unwrap().clone())
    }

    async fn insert_menu_item(&self, item: &MenuItemCreate) -> ClientResult<()> {
        self.record(format!("insert_menu_item({})", item.name));
        self.write_barrier().await
    }

    async fn update_menu_item(&self, id: i64, item: &MenuItemUpdate) -> ClientResult<()> {
        self.record(format!("update_menu_item({id}, {})", item.name));
        self.write_barrier().await
    }

    async fn delete_menu_item(&self, id: i64) -> ClientResult<()> {
        self.record(format!("delete_menu_item({id})"));
        self.write_barrier().await
    }

    async fn set_visibility(&self, id: i64, visible: bool) -> ClientResult<()> {
        self.record(format!("set_visibility({id}, {visible})"));
        self.write_barrier().await
    }

    async fn fetch_revenue(&self) -> ClientResult<Vec<RevenueRecord>> {
        self.record("fetch_revenue");
        Ok(self.revenue.lock().unwrap().clone())
    }

    async fn record_revenue(&self, date: NaiveDate, amount: f64) -> ClientResult<()> {
        self.record(format!("record_revenue({date}, {amount})"));
        self.write_barrier().await
    }
}
