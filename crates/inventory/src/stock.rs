use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use galley_core::{DomainError, DomainResult, IngredientName, MovementId, StockDate, validation};

/// Quantity on hand per ingredient, as loaded for a decision.
pub type StockLevels = BTreeMap<IngredientName, i64>;

/// Current stock of one ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub ingredient: IngredientName,
    pub quantity: i64,
    pub updated_on: StockDate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Addition,
    Deduction,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Addition => "addition",
            MovementKind::Deduction => "deduction",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "addition" => Ok(MovementKind::Addition),
            "deduction" => Ok(MovementKind::Deduction),
            other => Err(DomainError::validation(format!("unknown movement kind '{other}'"))),
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movement record ready to be appended (no id assigned yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub ingredient: IngredientName,
    /// For an addition: the quantity submitted. For a deduction: the amount removed.
    pub quantity: i64,
    pub kind: MovementKind,
    pub occurred_at: DateTime<Utc>,
    pub actor: String,
}

impl NewMovement {
    /// Attach the id assigned by the store on append.
    pub fn commit(self, id: MovementId) -> StockMovement {
        StockMovement {
            id,
            ingredient: self.ingredient,
            quantity: self.quantity,
            kind: self.kind,
            occurred_at: self.occurred_at,
            actor: self.actor,
        }
    }
}

/// An appended, immutable movement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub ingredient: IngredientName,
    pub quantity: i64,
    pub kind: MovementKind,
    pub occurred_at: DateTime<Utc>,
    pub actor: String,
}

/// Command: set an ingredient's quantity on hand (manual restock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restock {
    pub ingredient: IngredientName,
    pub quantity: i64,
    pub date: StockDate,
}

impl Restock {
    pub fn new(ingredient: IngredientName, quantity: i64, date: StockDate) -> DomainResult<Self> {
        let quantity = validation::validate_stock_quantity(quantity)?;
        Ok(Self {
            ingredient,
            quantity,
            date,
        })
    }

    /// Parse raw form input (every field arrives as text).
    pub fn parse(name: &str, quantity: &str, date: &str) -> DomainResult<Self> {
        if name.trim().is_empty() || quantity.trim().is_empty() || date.trim().is_empty() {
            return Err(DomainError::validation("all fields are required"));
        }
        let ingredient = IngredientName::parse(name)?;
        let quantity = validation::parse_quantity(ingredient.as_str(), quantity)?;
        let date = StockDate::parse(date)?;
        Self::new(ingredient, quantity, date)
    }

    pub fn entry(&self) -> StockEntry {
        StockEntry {
            ingredient: self.ingredient.clone(),
            quantity: self.quantity,
            updated_on: self.date,
        }
    }

    pub fn movement(&self, actor: &str, occurred_at: DateTime<Utc>) -> NewMovement {
        NewMovement {
            ingredient: self.ingredient.clone(),
            quantity: self.quantity,
            kind: MovementKind::Addition,
            occurred_at,
            actor: actor.to_string(),
        }
    }
}
