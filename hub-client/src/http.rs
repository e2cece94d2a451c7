//! HTTP table client
//!
//! Every data operation is a direct passthrough to a named table on the
//! hosted backend's row API. There is no request shaping beyond the query
//! string: ordering is pushed down, filtering by id uses `id=eq.N`.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, Order, RevenueRecord};

/// Error body returned by the backend's row API
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Typed operations over the remote tables
///
/// Object safe so services can hold an `Arc<dyn TableClient>` and tests can
/// substitute recording fakes.
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Full fetch of `orders`, ascending by creation time
    async fn fetch_orders(&self) -> ClientResult<Vec<Order>>;

    /// Set `payment_done = true` on one order
    async fn mark_payment_done(&self, id: i64) -> ClientResult<()>;

    /// Set `order_done = true` on one order
    async fn mark_order_done(&self, id: i64) -> ClientResult<()>;

    /// Full fetch of `menu`, ordered by category
    async fn fetch_menu(&self) -> ClientResult<Vec<MenuItem>>;

    async fn insert_menu_item(&self, item: &MenuItemCreate) -> ClientResult<()>;

    async fn update_menu_item(&self, id: i64, update: &MenuItemUpdate) -> ClientResult<()>;

    async fn delete_menu_item(&self, id: i64) -> ClientResult<()>;

    /// Partial update of the `Visibility` column only
    async fn set_visibility(&self, id: i64, visible: bool) -> ClientResult<()>;

    /// Full fetch of `analysis`, ascending by date
    async fn fetch_revenue(&self) -> ClientResult<Vec<RevenueRecord>>;

    /// Accumulate revenue for one calendar day.
    ///
    /// Issued as a single atomic upsert-increment on the backend, so
    /// concurrent writers cannot lose increments.
    async fn record_revenue(&self, date: NaiveDate, amount: f64) -> ClientResult<()>;
}

/// REST implementation of [`TableClient`]
#[derive(Debug, Clone)]
pub struct RestTableClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestTableClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", config.base_url),
            api_key: config.api_key.clone(),
        })
    }

    /// Table endpoint URL
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn get_rows<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        let response = self.with_auth(self.client.get(self.url(path))).send().await?;
        Self::handle_json(response).await
    }

    /// Issue a write (insert/update/delete); only the status is checked,
    /// the backend is asked not to echo the row back.
    async fn write(&self, req: reqwest::RequestBuilder) -> ClientResult<()> {
        let response = self
            .with_auth(req)
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        Self::handle_empty(response).await
    }

    async fn handle_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(status, response.text().await?));
        }
        Ok(response.json().await?)
    }

    async fn handle_empty(response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(status, response.text().await?));
        }
        Ok(())
    }

    fn error_from(status: StatusCode, body: String) -> ClientError {
        // The row API reports errors as {"code": ..., "message": ...}
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => match api_err.code {
                Some(code) => format!("{} ({})", api_err.message, code),
                None => api_err.message,
            },
            Err(_) => body,
        };
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            _ => ClientError::Internal(message),
        }
    }

    fn patch_by_id<B: Serialize>(&self, table: &str, id: i64, body: &B) -> reqwest::RequestBuilder {
        self.client
            .patch(self.url(&format!("{}?id=eq.{}", table, id)))
            .json(body)
    }
}

#[async_trait]
impl TableClient for RestTableClient {
    async fn fetch_orders(&self) -> ClientResult<Vec<Order>> {
        self.get_rows("orders?select=*&order=created_at.asc").await
    }

    async fn mark_payment_done(&self, id: i64) -> ClientResult<()> {
        self.write(self.patch_by_id("orders", id, &json!({ "payment_done": true })))
            .await
    }

    async fn mark_order_done(&self, id: i64) -> ClientResult<()> {
        self.write(self.patch_by_id("orders", id, &json!({ "order_done": true })))
            .await
    }

    async fn fetch_menu(&self) -> ClientResult<Vec<MenuItem>> {
        self.get_rows("menu?select=*&order=category.asc").await
    }

    async fn insert_menu_item(&self, item: &MenuItemCreate) -> ClientResult<()> {
        self.write(self.client.post(self.url("menu")).json(item)).await
    }

    async fn update_menu_item(&self, id: i64, update: &MenuItemUpdate) -> ClientResult<()> {
        self.write(self.patch_by_id("menu", id, update)).await
    }

    async fn delete_menu_item(&self, id: i64) -> ClientResult<()> {
        self.write(self.client.delete(self.url(&format!("menu?id=eq.{}", id))))
            .await
    }

    async fn set_visibility(&self, id: i64, visible: bool) -> ClientResult<()> {
        self.write(self.patch_by_id("menu", id, &json!({ "Visibility": visible })))
            .await
    }

    async fn fetch_revenue(&self) -> ClientResult<Vec<RevenueRecord>> {
        self.get_rows("analysis?select=date,amount&order=date.asc").await
    }

    async fn record_revenue(&self, date: NaiveDate, amount: f64) -> ClientResult<()> {
        let body = json!({
            "p_date": date.format("%Y-%m-%d").to_string(),
            "p_amount": amount,
        });
        self.write(self.client.post(self.url("rpc/record_revenue")).json(&body))
            .await
    }
}
