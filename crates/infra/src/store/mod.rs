//! Kitchen persistence: one trait, two backends.
//!
//! Every mutating method is a single atomic unit: either all of its rows are
//! written or none are. `serve_portion` additionally runs its read-check-write
//! sequence under the backend's write serialization so two concurrent serves
//! cannot both pass the sufficiency check on the same stock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use galley_auth::UserAccount;
use galley_core::{DishName, IngredientName};
use galley_inventory::{NewMovement, Recipe, ServingEvent, ServingReceipt, StockEntry, StockMovement};

use crate::config::AppConfig;
use crate::error::{ServeFailure, StoreResult};

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryKitchenStore;
pub use sqlite::SqliteKitchenStore;

#[async_trait]
pub trait KitchenStore: Send + Sync {
    /// Upsert a stock entry and append its addition movement together.
    async fn restock(&self, entry: StockEntry, movement: NewMovement) -> StoreResult<StockMovement>;

    async fn stock_entry(&self, ingredient: &IngredientName) -> StoreResult<Option<StockEntry>>;

    /// All stock entries in ingredient-name order.
    async fn stock_entries(&self) -> StoreResult<Vec<StockEntry>>;

    /// Movement log in insertion order.
    async fn movements(&self) -> StoreResult<Vec<StockMovement>>;

    /// Register the dish and replace its recipe lines wholesale.
    async fn put_recipe(&self, recipe: &Recipe) -> StoreResult<()>;

    /// `None` when the dish is unknown or has no lines.
    async fn recipe(&self, dish: &DishName) -> StoreResult<Option<Recipe>>;

    /// Dish names in order.
    async fn dishes(&self) -> StoreResult<Vec<DishName>>;

    /// Check and deduct one portion of `dish`, appending the deduction
    /// movements and the serving event, all stamped `actor`/`at`.
    async fn serve_portion(
        &self,
        dish: &DishName,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<ServingReceipt, ServeFailure>;

    /// Serving log in insertion order.
    async fn servings(&self) -> StoreResult<Vec<ServingEvent>>;

    /// Insert or replace an account.
    async fn put_account(&self, account: &UserAccount) -> StoreResult<()>;

    /// Insert an account unless the username exists; returns whether it was inserted.
    async fn insert_account_if_absent(&self, account: &UserAccount) -> StoreResult<bool>;

    async fn account(&self, username: &str) -> StoreResult<Option<UserAccount>>;
}

/// Open the store selected by configuration: SQLite when a database URL is
/// set, otherwise an in-memory store.
pub async fn open(config: &AppConfig) -> StoreResult<Arc<dyn KitchenStore>> {
    match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!(database_url = url, "opening sqlite kitchen store");
            Ok(Arc::new(SqliteKitchenStore::connect(url).await?))
        }
        None => {
            tracing::warn!("GALLEY_DATABASE_URL not set; using in-memory kitchen store");
            Ok(Arc::new(InMemoryKitchenStore::new()))
        }
    }
}
