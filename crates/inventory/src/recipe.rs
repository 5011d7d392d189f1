use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use galley_core::{DishName, DomainError, DomainResult, IngredientName, validation};

/// Ingredient requirements for one portion of a dish.
///
/// A recipe always has at least one line and every required quantity is
/// positive; setting a recipe replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    dish: DishName,
    lines: BTreeMap<IngredientName, i64>,
}

impl Recipe {
    pub fn new(dish: DishName, lines: BTreeMap<IngredientName, i64>) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("at least one ingredient is required"));
        }
        for (ingredient, quantity) in &lines {
            validation::validate_required_quantity(ingredient.as_str(), *quantity)?;
        }
        Ok(Self { dish, lines })
    }

    /// Build from raw names, validating each one.
    pub fn from_pairs<'a>(
        dish: &str,
        pairs: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> DomainResult<Self> {
        let dish = DishName::parse(dish)?;
        let mut lines = BTreeMap::new();
        for (name, quantity) in pairs {
            lines.insert(IngredientName::parse(name)?, quantity);
        }
        Self::new(dish, lines)
    }

    /// Parse the line-based `name:quantity` text format.
    pub fn parse_text(dish: &str, text: &str) -> DomainResult<Self> {
        let dish = DishName::parse(dish)?;
        let lines = parse_recipe_text(text)?;
        Self::new(dish, lines)
    }

    pub fn dish(&self) -> &DishName {
        &self.dish
    }

    pub fn lines(&self) -> &BTreeMap<IngredientName, i64> {
        &self.lines
    }

    pub fn required(&self, ingredient: &IngredientName) -> Option<i64> {
        self.lines.get(ingredient).copied()
    }

    pub fn ingredients(&self) -> impl Iterator<Item = &IngredientName> {
        self.lines.keys()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn into_lines(self) -> BTreeMap<IngredientName, i64> {
        self.lines
    }
}

/// Parse recipe text: one `name:quantity` pair per line, blank lines skipped.
///
/// Any malformed line fails the whole text. A repeated ingredient keeps the
/// last quantity given.
pub fn parse_recipe_text(text: &str) -> DomainResult<BTreeMap<IngredientName, i64>> {
    let mut lines = BTreeMap::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split(':');
        let (name, quantity) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(quantity), None) => (name.trim(), quantity.trim()),
            _ => {
                return Err(DomainError::validation(format!(
                    "invalid line '{line}': expected name:quantity"
                )));
            }
        };

        if name.is_empty() || quantity.is_empty() {
            return Err(DomainError::validation(format!(
                "ingredient name and quantity must not be empty: '{line}'"
            )));
        }

        let ingredient = IngredientName::parse(name)?;
        let quantity = validation::parse_quantity(ingredient.as_str(), quantity)?;
        let quantity = validation::validate_required_quantity(ingredient.as_str(), quantity)?;
        lines.insert(ingredient, quantity);
    }

    if lines.is_empty() {
        return Err(DomainError::validation("at least one ingredient is required"));
    }
    Ok(lines)
}
