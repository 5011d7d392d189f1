//! Read-only projections over the ledger and the serving log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use galley_core::{DishName, IngredientName};

use crate::serving::ServingEvent;
use crate::stock::StockEntry;

/// Default alert threshold, in stock units.
pub const LOW_STOCK_THRESHOLD: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub ingredient: IngredientName,
    pub quantity: i64,
}

impl core::fmt::Display for LowStockAlert {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} stock low: {} units", self.ingredient, self.quantity)
    }
}

/// Entries strictly below `threshold`, in ingredient-name order.
pub fn low_stock(entries: &[StockEntry], threshold: i64) -> Vec<LowStockAlert> {
    let mut alerts: Vec<LowStockAlert> = entries
        .iter()
        .filter(|e| e.quantity < threshold)
        .map(|e| LowStockAlert {
            ingredient: e.ingredient.clone(),
            quantity: e.quantity,
        })
        .collect();
    alerts.sort_by(|a, b| a.ingredient.cmp(&b.ingredient));
    alerts
}

/// Portions served per dish.
pub fn serving_counts(events: &[ServingEvent]) -> BTreeMap<DishName, u64> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.dish.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use galley_core::{ServingId, StockDate};

    fn entry(name: &str, quantity: i64) -> StockEntry {
        StockEntry {
            ingredient: IngredientName::parse(name).unwrap(),
            quantity,
            updated_on: StockDate::parse("2024-01-01").unwrap(),
        }
    }

    fn served(id: i64, dish: &str) -> ServingEvent {
        ServingEvent {
            id: ServingId::new(id),
            dish: DishName::parse(dish).unwrap(),
            served_at: Utc::now(),
            actor: "cook1".to_string(),
        }
    }

    #[test]
    fn low_stock_keeps_only_entries_below_threshold() {
        let alerts = low_stock(&[entry("flour", 50), entry("egg", 150)], LOW_STOCK_THRESHOLD);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].ingredient.as_str(), "flour");
        assert_eq!(alerts[0].to_string(), "flour stock low: 50 units");
    }

    #[test]
    fn threshold_itself_is_not_low() {
        assert!(low_stock(&[entry("salt", 100)], 100).is_empty());
        assert_eq!(low_stock(&[entry("salt", 99)], 100).len(), 1);
    }

    #[test]
    fn alerts_are_sorted_by_ingredient() {
        let alerts = low_stock(&[entry("sugar", 1), entry("butter", 2)], 10);
        let names: Vec<_> = alerts.iter().map(|a| a.ingredient.as_str()).collect();
        assert_eq!(names, vec!["butter", "sugar"]);
    }

    #[test]
    fn serving_counts_group_by_dish() {
        let counts = serving_counts(&[served(1, "Cake"), served(2, "Soup"), served(3, "Cake")]);
        assert_eq!(counts.get(&DishName::parse("Cake").unwrap()), Some(&2));
        assert_eq!(counts.get(&DishName::parse("Soup").unwrap()), Some(&1));
    }

    #[test]
    fn no_servings_yield_an_empty_report() {
        assert!(serving_counts(&[]).is_empty());
    }
}
