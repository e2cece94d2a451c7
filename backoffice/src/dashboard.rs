//! Dashboard core
//!
//! Owns the three table services and the notice center, seeds them with
//! full fetches, and then keeps them current from a single change-feed
//! subscription. Events are dispatched strictly in arrival order; a
//! lagged subscription falls back to a full refetch of every table.

use std::sync::Arc;
use std::time::Duration;

use hub_client::TableClient;
use shared::feed::{tables, ChangeEvent, ChangeKind};
use shared::models::MenuItem;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::analytics::{self, SummaryMetrics};
use crate::core::{AppResult, Config};
use crate::menu::{ItemForm, MenuFilter, MenuManager};
use crate::notice::NoticeCenter;
use crate::orders::{MutationOutcome, OrderBoard};
use crate::revenue::RevenueService;

pub struct Dashboard {
    pub orders: OrderBoard,
    pub menu: MenuManager,
    pub revenue: RevenueService,
    pub notices: NoticeCenter,
}

impl Dashboard {
    pub fn new(client: Arc<dyn TableClient>, config: &Config) -> Self {
        let mutation_timeout = Duration::from_millis(config.mutation_timeout_ms);
        Self {
            orders: OrderBoard::new(Arc::clone(&client), mutation_timeout),
            menu: MenuManager::new(Arc::clone(&client), mutation_timeout),
            revenue: RevenueService::new(client, config.business_tz),
            notices: NoticeCenter::new(Duration::from_millis(config.notice_ttl_ms)),
        }
    }

    /// Seed every mirror with a full fetch
    pub async fn initialize(&self) -> AppResult<()> {
        self.orders.refresh().await?;
        self.menu.refresh().await?;
        self.revenue.refresh().await?;
        info!(
            orders = self.orders.orders().len(),
            menu_items = self.menu.items().len(),
            revenue_days = self.revenue.records().len(),
            "dashboard seeded"
        );
        Ok(())
    }

    /// Consume change-feed events until the feed closes.
    ///
    /// Events are applied one at a time in delivery order. Falling
    /// behind the broadcast channel loses events, so a lag is repaired
    /// by refetching everything.
    pub async fn run(&self, mut events: broadcast::Receiver<ChangeEvent>) -> AppResult<()> {
        loop {
            match events.recv().await {
                Ok(event) => self.dispatch(&event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "change feed lagged, refetching all tables");
                    self.initialize().await?;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("change feed closed");
                    return Ok(());
                }
            }
        }
    }

    fn dispatch(&self, event: &ChangeEvent) {
        match event.table.as_str() {
            tables::ORDERS => {
                self.orders.apply(event);
            }
            tables::MENU => {
                self.notify_menu_change(event);
                self.menu.apply(event);
            }
            tables::ANALYSIS => self.revenue.apply(event),
            other => debug!(table = other, "event for an unmirrored table"),
        }
    }

    fn notify_menu_change(&self, event: &ChangeEvent) {
        match event.kind {
            ChangeKind::Insert => {
                if let Some(item) = event.new_row::<MenuItem>() {
                    self.notices.success(format!("Item added: {}", item.name));
                }
            }
            ChangeKind::Update => {
                if let Some(item) = event.new_row::<MenuItem>() {
                    self.notices.success(format!("Item updated: {}", item.name));
                }
            }
            ChangeKind::Delete => self.notices.success("Item removed"),
        }
    }

    // Mutation entry points. Failures become operator notices as well as
    // returned errors, so a caller that only renders state still shows
    // what went wrong.

    pub async fn pay_order(&self, id: i64) -> AppResult<MutationOutcome> {
        self.noticed("Payment update failed", self.orders.mark_payment_done(id))
            .await
    }

    pub async fn complete_order(&self, id: i64) -> AppResult<MutationOutcome> {
        self.noticed("Order update failed", self.orders.mark_order_done(id))
            .await
    }

    pub async fn add_menu_item(&self, form: ItemForm) -> AppResult<MutationOutcome> {
        self.noticed("Could not add item", self.menu.add_item(form))
            .await
    }

    pub async fn update_menu_item(&self, id: i64, form: ItemForm) -> AppResult<MutationOutcome> {
        self.noticed("Could not update item", self.menu.update_item(id, form))
            .await
    }

    pub async fn delete_menu_item(&self, id: i64) -> AppResult<MutationOutcome> {
        self.noticed("Could not delete item", self.menu.delete_item(id))
            .await
    }

    pub async fn toggle_visibility(&self, id: i64) -> AppResult<MutationOutcome> {
        self.noticed("Could not change visibility", self.menu.toggle_visibility(id))
            .await
    }

    pub async fn post_revenue(&self, amount: f64) -> AppResult<()> {
        match self.revenue.record(amount).await {
            Ok(()) => {
                self.notices.success("Revenue recorded");
                Ok(())
            }
            Err(err) => {
                self.notices.error(format!("Could not record revenue: {err}"));
                Err(err)
            }
        }
    }

    async fn noticed(
        &self,
        label: &str,
        action: impl Future<Output = AppResult<MutationOutcome>>,
    ) -> AppResult<MutationOutcome> {
        match action.await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.notices.error(format!("{label}: {err}"));
                Err(err)
            }
        }
    }

    /// Headline metrics as of today in the business timezone
    pub fn summary(&self) -> SummaryMetrics {
        analytics::summary_metrics(&self.revenue.records(), self.revenue.today())
    }

    /// Catalogue narrowed for the menu view
    pub fn menu_view(&self, filter: &MenuFilter) -> Vec<MenuItem> {
        self.menu.filtered(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use crate::testing::MockTableClient;
    use chrono_tz::Tz;
    use serde_json::json;

    fn dashboard() -> (Arc<MockTableClient>, Dashboard) {
        let client = Arc::new(MockTableClient::new());
        let config = Config {
            business_tz: "Asia/Kolkata".parse::<Tz>().unwrap(),
            ..Config::default()
        };
        let dash = Dashboard::new(Arc::clone(&client) as Arc<dyn TableClient>, &config);
        (client, dash)
    }

    #[tokio::test]
    async fn initialize_fetches_all_three_tables() {
        let (client, dash) = dashboard();
        dash.initialize().await.unwrap();
        assert_eq!(
            client.calls(),
            vec!["fetch_orders", "fetch_menu", "fetch_revenue"]
        );
    }

    #[tokio::test]
    async fn run_dispatches_by_table_and_stops_on_close() {
        let (_, dash) = dashboard();
        dash.initialize().await.unwrap();

        let (tx, rx) = broadcast::channel(16);
        tx.send(ChangeEvent::insert(
            tables::MENU,
            json!({ "id": 1, "name": "Samosa", "price": 25, "category": "Snacks" }),
        ))
        .unwrap();
        tx.send(ChangeEvent::insert(
            tables::ANALYSIS,
            json!({ "date": "2024-06-01", "amount": 100.0 }),
        ))
        .unwrap();
        drop(tx);

        dash.run(rx).await.unwrap();
        assert_eq!(dash.menu.items().len(), 1);
        assert_eq!(dash.revenue.records().len(), 1);
    }

    #[tokio::test]
    async fn menu_feed_events_post_notices() {
        let (_, dash) = dashboard();

        let (tx, rx) = broadcast::channel(16);
        tx.send(ChangeEvent::insert(
            tables::MENU,
            json!({ "id": 1, "name": "Samosa", "price": 25, "category": "Snacks" }),
        ))
        .unwrap();
        tx.send(ChangeEvent::delete(tables::MENU, json!({ "id": 1 })))
            .unwrap();
        drop(tx);
        dash.run(rx).await.unwrap();

        let notices = dash.notices.active();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "Item added: Samosa");
        assert_eq!(notices[1].message, "Item removed");
    }

    #[tokio::test]
    async fn failed_mutation_posts_an_error_notice() {
        let (client, dash) = dashboard();
        *client.orders.lock().unwrap() = vec![shared::models::Order {
            id: 1,
            created_at: chrono::Utc::now(),
            tableno: 2,
            payment_done: false,
            order_done: false,
            items: Vec::new(),
        }];
        dash.initialize().await.unwrap();
        client.fail_writes();

        assert!(dash.pay_order(1).await.is_err());
        let notices = dash.notices.active();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.starts_with("Payment update failed"));
    }

    #[tokio::test]
    async fn events_for_unknown_tables_are_ignored() {
        let (_, dash) = dashboard();
        let (tx, rx) = broadcast::channel(16);
        tx.send(ChangeEvent::insert("audit_log", json!({ "id": 1 })))
            .unwrap();
        drop(tx);
        dash.run(rx).await.unwrap();
        assert!(dash.notices.active().is_empty());
    }
}
