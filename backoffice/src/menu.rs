//! Menu manager
//!
//! Mirrors the `menu` table and drives the catalogue mutations: add,
//! edit, remove and show/hide. A per-item gate rejects overlapping
//! writes to the same item, and one synthetic slot guards the add form
//! so the same new item cannot be submitted twice.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hub_client::TableClient;
use shared::feed::ChangeEvent;
use shared::models::{MenuCategory, MenuItem, MenuItemCreate, MenuItemUpdate};
use tokio::time::timeout;
use tracing::warn;
use validator::Validate;

use crate::core::{AppError, AppResult};
use crate::gate::MutationGate;
use crate::orders::MutationOutcome;
use crate::sync::{Collection, Delta};

/// Gate slot claimed while an add submission is in flight
const ADD_GATE_ID: i64 = -1;

/// Validated input for add and edit submissions
#[derive(Debug, Clone, Validate)]
pub struct ItemForm {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    pub category: MenuCategory,
}

impl ItemForm {
    pub fn new(name: impl Into<String>, price: i64, category: MenuCategory) -> Self {
        Self {
            name: name.into().trim().to_string(),
            price,
            category,
        }
    }

    fn checked(self) -> AppResult<Self> {
        self.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(self)
    }
}

/// Search and category narrowing for the catalogue view
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    pub search: Option<String>,
    pub category: Option<MenuCategory>,
}

impl MenuFilter {
    fn matches(&self, item: &MenuItem) -> bool {
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }
        match &self.search {
            Some(needle) if !needle.trim().is_empty() => {
                let needle = needle.trim().to_lowercase();
                item.name.to_lowercase().contains(&needle)
                    || item.category.label().to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

pub struct MenuManager {
    client: Arc<dyn TableClient>,
    menu: Mutex<Collection<MenuItem>>,
    gate: MutationGate,
    mutation_timeout: Duration,
}

impl MenuManager {
    pub fn new(client: Arc<dyn TableClient>, mutation_timeout: Duration) -> Self {
        Self {
            client,
            menu: Mutex::new(Collection::new()),
            gate: MutationGate::new(),
            mutation_timeout,
        }
    }

    /// Seed the catalogue from a full fetch
    pub async fn refresh(&self) -> AppResult<()> {
        let rows = self.client.fetch_menu().await?;
        self.menu.lock().unwrap().reset(rows);
        Ok(())
    }

    /// Apply one change-feed event for the menu table
    pub fn apply(&self, event: &ChangeEvent) -> Option<Delta> {
        self.menu.lock().unwrap().apply(event)
    }

    pub fn items(&self) -> Vec<MenuItem> {
        self.menu.lock().unwrap().rows().to_vec()
    }

    pub fn get(&self, id: i64) -> Option<MenuItem> {
        self.menu.lock().unwrap().get(id).cloned()
    }

    /// Catalogue narrowed by the given filter, mirror order preserved
    pub fn filtered(&self, filter: &MenuFilter) -> Vec<MenuItem> {
        self.menu
            .lock()
            .unwrap()
            .rows()
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Delta> {
        self.menu.lock().unwrap().subscribe()
    }

    pub fn is_busy(&self, id: i64) -> bool {
        self.gate.is_busy(id)
    }

    pub fn add_busy(&self) -> bool {
        self.gate.is_busy(ADD_GATE_ID)
    }

    pub async fn add_item(&self, form: ItemForm) -> AppResult<MutationOutcome> {
        let form = form.checked()?;
        let create = MenuItemCreate {
            name: form.name,
            price: form.price,
            category: form.category,
        };
        self.guarded(ADD_GATE_ID, self.client.insert_menu_item(&create))
            .await
    }

    pub async fn update_item(&self, id: i64, form: ItemForm) -> AppResult<MutationOutcome> {
        self.require_known(id)?;
        let form = form.checked()?;
        let update = MenuItemUpdate {
            name: form.name,
            price: form.price,
            category: form.category,
        };
        self.guarded(id, self.client.update_menu_item(id, &update))
            .await
    }

    pub async fn delete_item(&self, id: i64) -> AppResult<MutationOutcome> {
        self.require_known(id)?;
        self.guarded(id, self.client.delete_menu_item(id)).await
    }

    /// Flip an item between shown and hidden.
    ///
    /// The target state is the inverse of the current mirrored value, so
    /// two quick toggles that both get through land the item back where
    /// it started.
    pub async fn toggle_visibility(&self, id: i64) -> AppResult<MutationOutcome> {
        let current = self
            .get(id)
            .ok_or_else(|| AppError::not_found(format!("menu item {id}")))?
            .visibility;
        self.guarded(id, self.client.set_visibility(id, !current))
            .await
    }

    fn require_known(&self, id: i64) -> AppResult<()> {
        if self.menu.lock().unwrap().get(id).is_none() {
            return Err(AppError::not_found(format!("menu item {id}")));
        }
        Ok(())
    }

    async fn guarded(
        &self,
        id: i64,
        write: impl Future<Output = hub_client::ClientResult<()>>,
    ) -> AppResult<MutationOutcome> {
        let Some(_guard) = self.gate.try_acquire(id) else {
            return Ok(MutationOutcome::InFlight);
        };
        match timeout(self.mutation_timeout, write).await {
            Ok(Ok(())) => Ok(MutationOutcome::Applied),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => {
                warn!(item = id, "mutation timed out, releasing gate");
                self.gate.force_release(id);
                Err(AppError::Timeout(self.mutation_timeout.as_millis() as u64))
            }
        }
    }
}
