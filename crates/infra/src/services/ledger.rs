use std::sync::Arc;

use chrono::Utc;

use galley_core::IngredientName;
use galley_inventory::{Restock, StockEntry, StockMovement};

use crate::error::ServiceResult;
use crate::store::KitchenStore;

/// Quantity on hand per ingredient plus the append-only movement log.
#[derive(Clone)]
pub struct StockLedger {
    store: Arc<dyn KitchenStore>,
}

impl StockLedger {
    pub fn new(store: Arc<dyn KitchenStore>) -> Self {
        Self { store }
    }

    /// Set the ingredient's quantity and date, logging an addition movement
    /// in the same transaction.
    pub async fn add_or_replace(&self, restock: Restock, actor: &str) -> ServiceResult<StockMovement> {
        let movement = self
            .store
            .restock(restock.entry(), restock.movement(actor, Utc::now()))
            .await?;

        tracing::info!(
            ingredient = %restock.ingredient,
            quantity = restock.quantity,
            date = %restock.date,
            actor,
            movement_id = %movement.id,
            "stock updated"
        );
        Ok(movement)
    }

    pub async fn get(&self, ingredient: &IngredientName) -> ServiceResult<Option<StockEntry>> {
        tracing::debug!(%ingredient, "stock lookup");
        Ok(self.store.stock_entry(ingredient).await?)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<StockEntry>> {
        Ok(self.store.stock_entries().await?)
    }

    pub async fn history(&self) -> ServiceResult<Vec<StockMovement>> {
        Ok(self.store.movements().await?)
    }
}
