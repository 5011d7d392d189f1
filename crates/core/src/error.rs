//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing recipes, stock shortfalls). Storage and authorization failures
/// belong to the layers that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (malformed name, quantity, date or recipe text).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The dish has no recipe (absent or without lines).
    #[error("recipe not found for '{0}'")]
    RecipeNotFound(String),

    /// A portion cannot be made; carries one message per shortfall.
    #[error("insufficient stock: {}", .0.join("; "))]
    InsufficientStock(Vec<String>),

    /// A requested record does not exist; carries the caller-facing message.
    #[error("{0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn recipe_not_found(dish: impl Into<String>) -> Self {
        Self::RecipeNotFound(dish.into())
    }

    pub fn insufficient_stock(reasons: Vec<String>) -> Self {
        Self::InsufficientStock(reasons)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn stock_entry_not_found(ingredient: &str) -> Self {
        Self::not_found(format!("no stock entry for '{ingredient}'"))
    }

    /// Human-readable messages for the caller, in order.
    ///
    /// `InsufficientStock` expands into one message per shortfall; every other
    /// variant yields a single message.
    pub fn messages(&self) -> Vec<String> {
        match self {
            DomainError::Validation(msg) => vec![msg.clone()],
            DomainError::InsufficientStock(reasons) => reasons.clone(),
            other => vec![other.to_string()],
        }
    }
}
