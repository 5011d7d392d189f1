//! Kitchen inventory domain module.
//!
//! This crate contains business rules for stock, recipes and serving,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod recipe;
pub mod report;
pub mod serving;
pub mod stock;

pub use recipe::{Recipe, parse_recipe_text};
pub use report::{LOW_STOCK_THRESHOLD, LowStockAlert, low_stock, serving_counts};
pub use serving::{
    Availability, NOT_ENOUGH_FOR_ONE_PORTION, NewServing, PortionPlan, ServingEvent,
    ServingReceipt, Shortfall, assess, plan_portion, require_recipe,
};
pub use stock::{MovementKind, NewMovement, Restock, StockEntry, StockLevels, StockMovement};
