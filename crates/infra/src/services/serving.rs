use std::sync::Arc;

use chrono::Utc;

use galley_core::DishName;
use galley_inventory::ServingReceipt;

use crate::error::{ServeFailure, ServiceResult};
use crate::store::KitchenStore;

/// Serve exactly one portion of a dish.
#[derive(Clone)]
pub struct ServingWorkflow {
    store: Arc<dyn KitchenStore>,
}

impl ServingWorkflow {
    pub fn new(store: Arc<dyn KitchenStore>) -> Self {
        Self { store }
    }

    /// Check stock for one portion and, if sufficient, deduct the recipe and
    /// record the serving as one unit. On any failure stock is unchanged.
    ///
    /// The deduction movements and the serving event share one timestamp.
    pub async fn serve(&self, dish: &DishName, actor: &str) -> ServiceResult<ServingReceipt> {
        let at = Utc::now();
        match self.store.serve_portion(dish, actor, at).await {
            Ok(receipt) => {
                tracing::info!(
                    %dish,
                    actor,
                    serving_id = %receipt.serving.id,
                    deductions = receipt.movements.len(),
                    "portion served"
                );
                Ok(receipt)
            }
            Err(ServeFailure::Rejected(reason)) => {
                tracing::warn!(%dish, actor, reasons = ?reason.messages(), "serve rejected");
                Err(reason.into())
            }
            Err(ServeFailure::Store(e)) => {
                tracing::error!(%dish, actor, error = %e, "serve failed in storage");
                Err(e.into())
            }
        }
    }
}
