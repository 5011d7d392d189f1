//! Component services over an injected [`KitchenStore`](crate::store::KitchenStore).
//!
//! These do not authorize; [`Kitchen`](crate::kitchen::Kitchen) does that
//! before calling them.

pub mod accounts;
pub mod catalog;
pub mod ledger;
pub mod reporting;
pub mod serving;

pub use accounts::AccountDirectory;
pub use catalog::RecipeCatalog;
pub use ledger::StockLedger;
pub use reporting::Reporting;
pub use serving::ServingWorkflow;
