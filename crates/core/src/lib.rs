//! `galley-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod validation;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{MovementId, ServingId};
pub use value_object::{DishName, IngredientName, StockDate};
