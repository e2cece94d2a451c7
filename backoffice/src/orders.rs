//! Live order board
//!
//! Mirrors the `orders` table and drives the two order actions: marking
//! payment received and marking the food delivered. Each flag is a
//! one-way transition; re-marking a flag that is already set never
//! reaches the network, and a second click while the first write is
//! still in flight is rejected by the per-order gate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hub_client::TableClient;
use shared::feed::ChangeEvent;
use shared::models::Order;
use tokio::time::timeout;
use tracing::warn;

use crate::core::{AppError, AppResult};
use crate::gate::MutationGate;
use crate::sync::{Collection, Delta};

/// Result of a mark request that did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The write was sent and acknowledged
    Applied,
    /// The flag was already set locally; nothing was sent
    AlreadyDone,
    /// Another mutation for this order is still in flight
    InFlight,
}

/// Which of the two order flags a mark request targets
#[derive(Debug, Clone, Copy)]
enum OrderFlag {
    Payment,
    Completion,
}

pub struct OrderBoard {
    client: Arc<dyn TableClient>,
    orders: Mutex<Collection<Order>>,
    payment_gate: MutationGate,
    completion_gate: MutationGate,
    mutation_timeout: Duration,
}

impl OrderBoard {
    pub fn new(client: Arc<dyn TableClient>, mutation_timeout: Duration) -> Self {
        Self {
            client,
            orders: Mutex::new(Collection::new()),
            payment_gate: MutationGate::new(),
            completion_gate: MutationGate::new(),
            mutation_timeout,
        }
    }

    /// Seed the board from a full fetch
    pub async fn refresh(&self) -> AppResult<()> {
        let rows = self.client.fetch_orders().await?;
        self.orders.lock().unwrap().reset(rows);
        Ok(())
    }

    /// Apply one change-feed event for the orders table
    pub fn apply(&self, event: &ChangeEvent) -> Option<Delta> {
        self.orders.lock().unwrap().apply(event)
    }

    /// All mirrored orders in arrival order
    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().rows().to_vec()
    }

    /// Orders still missing at least one flag
    pub fn active_orders(&self) -> Vec<Order> {
        self.orders
            .lock()
            .unwrap()
            .rows()
            .iter()
            .filter(|o| !o.is_completed())
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Delta> {
        self.orders.lock().unwrap().subscribe()
    }

    pub async fn mark_payment_done(&self, id: i64) -> AppResult<MutationOutcome> {
        self.mark(id, OrderFlag::Payment).await
    }

    pub async fn mark_order_done(&self, id: i64) -> AppResult<MutationOutcome> {
        self.mark(id, OrderFlag::Completion).await
    }

    pub fn payment_busy(&self, id: i64) -> bool {
        self.payment_gate.is_busy(id)
    }

    pub fn completion_busy(&self, id: i64) -> bool {
        self.completion_gate.is_busy(id)
    }

    async fn mark(&self, id: i64, flag: OrderFlag) -> AppResult<MutationOutcome> {
        {
            let orders = self.orders.lock().unwrap();
            let order = orders
                .get(id)
                .ok_or_else(|| AppError::not_found(format!("order {id}")))?;
            let already = match flag {
                OrderFlag::Payment => order.payment_done,
                OrderFlag::Completion => order.order_done,
            };
            if already {
                return Ok(MutationOutcome::AlreadyDone);
            }
        }

        let gate = match flag {
            OrderFlag::Payment => &self.payment_gate,
            OrderFlag::Completion => &self.completion_gate,
        };
        let Some(_guard) = gate.try_acquire(id) else {
            return Ok(MutationOutcome::InFlight);
        };

        let write = async {
            match flag {
                OrderFlag::Payment => self.client.mark_payment_done(id).await,
                OrderFlag::Completion => self.client.mark_order_done(id).await,
            }
        };
        match timeout(self.mutation_timeout, write).await {
            Ok(Ok(())) => Ok(MutationOutcome::Applied),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => {
                warn!(order = id, "mutation timed out, releasing gate");
                gate.force_release(id);
                Err(AppError::Timeout(self.mutation_timeout.as_millis() as u64))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTableClient;
    use chrono::Utc;

    fn order(id: i64, payment_done: bool, order_done: bool) -> Order {
        Order {
            id,
            created_at: Utc::now(),
            tableno: 4,
            payment_done,
            order_done,
            items: Vec::new(),
        }
    }

    fn board_with(orders: Vec<Order>) -> (Arc<MockTableClient>, OrderBoard) {
        let client = Arc::new(MockTableClient::new());
        *client.orders.lock().unwrap() = orders;
        let board = OrderBoard::new(
            Arc::clone(&client) as Arc<dyn TableClient>,
            Duration::from_secs(5),
        );
        (client, board)
    }

    #[tokio::test]
    async fn marking_an_open_order_sends_one_write() {
        let (client, board) = board_with(vec![order(1, false, false)]);
        board.refresh().await.unwrap();

        let outcome = board.mark_payment_done(1).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(client.write_calls(), vec!["mark_payment_done(1)"]);
    }

    #[tokio::test]
    async fn already_set_flag_never_reaches_the_network() {
        let (client, board) = board_with(vec![order(1, true, false)]);
        board.refresh().await.unwrap();

        let outcome = board.mark_payment_done(1).await.unwrap();
        assert_eq!(outcome, MutationOutcome::AlreadyDone);
        assert!(client.write_calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_order_is_an_error() {
        let (_, board) = board_with(vec![]);
        board.refresh().await.unwrap();

        let err = board.mark_order_done(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn double_submit_makes_exactly_one_network_call() {
        let (client, board) = board_with(vec![order(1, false, false)]);
        board.refresh().await.unwrap();
        let board = Arc::new(board);

        let release = client.hold_writes();
        let first = tokio::spawn({
            let board = Arc::clone(&board);
            async move { board.mark_payment_done(1).await }
        });
        // Let the first request reach the held write
        while !board.payment_busy(1) {
            tokio::task::yield_now().await;
        }

        let second = board.mark_payment_done(1).await.unwrap();
        assert_eq!(second, MutationOutcome::InFlight);

        release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), MutationOutcome::Applied);
        assert_eq!(client.write_calls(), vec!["mark_payment_done(1)"]);
    }

    #[tokio::test]
    async fn flags_gate_independently() {
        let (client, board) = board_with(vec![order(1, false, false)]);
        board.refresh().await.unwrap();
        let board = Arc::new(board);

        let release = client.hold_writes();
        let payment = tokio::spawn({
            let board = Arc::clone(&board);
            async move { board.mark_payment_done(1).await }
        });
        while !board.payment_busy(1) {
            tokio::task::yield_now().await;
        }

        // The completion flag has its own gate
        let completion = tokio::spawn({
            let board = Arc::clone(&board);
            async move { board.mark_order_done(1).await }
        });
        while !board.completion_busy(1) {
            tokio::task::yield_now().await;
        }

        release.notify_one();
        release.notify_one();
        assert_eq!(payment.await.unwrap().unwrap(), MutationOutcome::Applied);
        assert_eq!(completion.await.unwrap().unwrap(), MutationOutcome::Applied);
    }

    #[tokio::test]
    async fn write_failure_surfaces_and_frees_the_gate() {
        let (client, board) = board_with(vec![order(1, false, false)]);
        board.refresh().await.unwrap();
        client.fail_writes();

        let err = board.mark_payment_done(1).await.unwrap_err();
        assert!(matches!(err, AppError::Client(_)));
        assert!(!board.payment_busy(1));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_mutation_force_clears_the_gate() {
        let client = Arc::new(MockTableClient::new());
        *client.orders.lock().unwrap() = vec![order(1, false, false)];
        let board = OrderBoard::new(
            Arc::clone(&client) as Arc<dyn TableClient>,
            Duration::from_millis(50),
        );
        board.refresh().await.unwrap();

        let _release = client.hold_writes();
        let err = board.mark_payment_done(1).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(50)));
        assert!(!board.payment_busy(1));

        // The order is actionable again right away
        client.fail_writes();
        let err = board.mark_payment_done(1).await.unwrap_err();
        assert!(matches!(err, AppError::Client(_)));
    }

    #[tokio::test]
    async fn feed_events_update_the_mirror() {
        let (_, board) = board_with(vec![order(1, false, false)]);
        board.refresh().await.unwrap();

        let updated = serde_json::json!({
            "id": 1,
            "created_at": Utc::now().to_rfc3339(),
            "tableno": 4,
            "payment_done": true,
            "order_done": false,
            "iteminfo": "[]"
        });
        board.apply(&ChangeEvent::update(shared::feed::tables::ORDERS, updated));

        assert!(board.orders()[0].payment_done);
        let outcome = board.mark_payment_done(1).await.unwrap();
        assert_eq!(outcome, MutationOutcome::AlreadyDone);
    }
}
