use std::collections::BTreeMap;
use std::sync::Arc;

use galley_core::DishName;
use galley_inventory::{LowStockAlert, ServingEvent, low_stock, serving_counts};

use crate::error::ServiceResult;
use crate::store::KitchenStore;

/// Read-only projections over the ledger and the serving log.
#[derive(Clone)]
pub struct Reporting {
    store: Arc<dyn KitchenStore>,
    threshold: i64,
}

impl Reporting {
    pub fn with_threshold(store: Arc<dyn KitchenStore>, threshold: i64) -> Self {
        Self { store, threshold }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Ingredients below the configured threshold.
    pub async fn low_stock(&self) -> ServiceResult<Vec<LowStockAlert>> {
        self.low_stock_below(self.threshold).await
    }

    pub async fn low_stock_below(&self, threshold: i64) -> ServiceResult<Vec<LowStockAlert>> {
        let entries = self.store.stock_entries().await?;
        Ok(low_stock(&entries, threshold))
    }

    pub async fn serving_counts(&self) -> ServiceResult<BTreeMap<DishName, u64>> {
        let events = self.store.servings().await?;
        Ok(serving_counts(&events))
    }

    pub async fn serving_history(&self) -> ServiceResult<Vec<ServingEvent>> {
        Ok(self.store.servings().await?)
    }
}
