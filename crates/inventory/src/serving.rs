//! Serving decision: can one portion be made, and what does it deduct?
//!
//! Everything here is pure. Stores call [`plan_portion`] inside their write
//! critical section and then apply the returned plan as one unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use galley_core::{DishName, DomainError, DomainResult, IngredientName, ServingId};

use crate::recipe::Recipe;
use crate::stock::{MovementKind, NewMovement, StockLevels, StockMovement};

/// Generic rejection used when no per-ingredient shortfall explains it.
pub const NOT_ENOUGH_FOR_ONE_PORTION: &str = "not enough ingredients to serve one portion";

/// Why a single ingredient blocks a portion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shortfall {
    Missing {
        ingredient: IngredientName,
    },
    Insufficient {
        ingredient: IngredientName,
        available: i64,
        required: i64,
    },
}

impl core::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Shortfall::Missing { ingredient } => write!(f, "{ingredient} missing from stock"),
            Shortfall::Insufficient {
                ingredient,
                available,
                required,
            } => write!(
                f,
                "{ingredient} insufficient: {available} available, {required} required"
            ),
        }
    }
}

/// Result of comparing a recipe against stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub shortfalls: Vec<Shortfall>,
    /// Minimum `stock / required` over the ingredients that have a stock
    /// entry; `None` when none of them do.
    pub portions: Option<i64>,
}

/// Compare every recipe line against current stock (ingredient-name order).
pub fn assess(recipe: &Recipe, stock: &StockLevels) -> Availability {
    let mut shortfalls = Vec::new();
    let mut portions: Option<i64> = None;

    for (ingredient, &required) in recipe.lines() {
        let Some(&available) = stock.get(ingredient) else {
            shortfalls.push(Shortfall::Missing {
                ingredient: ingredient.clone(),
            });
            continue;
        };

        let possible = available.div_euclid(required);
        if available < required {
            shortfalls.push(Shortfall::Insufficient {
                ingredient: ingredient.clone(),
                available,
                required,
            });
        }
        portions = Some(portions.map_or(possible, |p| p.min(possible)));
    }

    Availability {
        shortfalls,
        portions,
    }
}

/// Turn "no recipe" into the domain error.
pub fn require_recipe(dish: &DishName, recipe: Option<Recipe>) -> DomainResult<Recipe> {
    recipe.ok_or_else(|| DomainError::recipe_not_found(dish.as_str()))
}

/// What serving one portion deducts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortionPlan {
    dish: DishName,
    deductions: Vec<(IngredientName, i64)>,
}

impl PortionPlan {
    pub fn dish(&self) -> &DishName {
        &self.dish
    }

    pub fn deductions(&self) -> &[(IngredientName, i64)] {
        &self.deductions
    }

    /// Deduction movement records, all stamped with the same actor and time.
    pub fn movements(&self, actor: &str, at: DateTime<Utc>) -> Vec<NewMovement> {
        self.deductions
            .iter()
            .map(|(ingredient, quantity)| NewMovement {
                ingredient: ingredient.clone(),
                quantity: *quantity,
                kind: MovementKind::Deduction,
                occurred_at: at,
                actor: actor.to_string(),
            })
            .collect()
    }

    pub fn serving(&self, actor: &str, at: DateTime<Utc>) -> NewServing {
        NewServing {
            dish: self.dish.clone(),
            served_at: at,
            actor: actor.to_string(),
        }
    }
}

/// Decide whether one portion of `recipe` can be served from `stock`.
///
/// Fails with `InsufficientStock` listing every shortfall, or with the generic
/// message if the portion count is somehow zero without a shortfall.
pub fn plan_portion(recipe: &Recipe, stock: &StockLevels) -> DomainResult<PortionPlan> {
    let availability = assess(recipe, stock);

    if !availability.shortfalls.is_empty() {
        return Err(DomainError::insufficient_stock(
            availability.shortfalls.iter().map(|s| s.to_string()).collect(),
        ));
    }

    match availability.portions {
        Some(p) if p >= 1 => {}
        _ => {
            return Err(DomainError::insufficient_stock(vec![
                NOT_ENOUGH_FOR_ONE_PORTION.to_string(),
            ]));
        }
    }

    Ok(PortionPlan {
        dish: recipe.dish().clone(),
        deductions: recipe
            .lines()
            .iter()
            .map(|(ingredient, quantity)| (ingredient.clone(), *quantity))
            .collect(),
    })
}

/// A serving event ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServing {
    pub dish: DishName,
    pub served_at: DateTime<Utc>,
    pub actor: String,
}

impl NewServing {
    pub fn commit(self, id: ServingId) -> ServingEvent {
        ServingEvent {
            id,
            dish: self.dish,
            served_at: self.served_at,
            actor: self.actor,
        }
    }
}

/// One served portion (append-only log entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServingEvent {
    pub id: ServingId,
    pub dish: DishName,
    pub served_at: DateTime<Utc>,
    pub actor: String,
}

/// Everything a successful serve committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServingReceipt {
    pub serving: ServingEvent,
    pub movements: Vec<StockMovement>,
}

impl ServingReceipt {
    /// Always one: the workflow serves exactly one portion per call.
    pub fn portions_served(&self) -> u32 {
        1
    }
}
