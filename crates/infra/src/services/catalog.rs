use std::sync::Arc;

use galley_core::DishName;
use galley_inventory::Recipe;

use crate::error::ServiceResult;
use crate::store::KitchenStore;

/// Dish name to required ingredient quantities.
#[derive(Clone)]
pub struct RecipeCatalog {
    store: Arc<dyn KitchenStore>,
}

impl RecipeCatalog {
    pub fn new(store: Arc<dyn KitchenStore>) -> Self {
        Self { store }
    }

    /// Replace the dish's recipe wholesale, registering the dish if new.
    pub async fn set_recipe(&self, recipe: Recipe) -> ServiceResult<Recipe> {
        self.store.put_recipe(&recipe).await?;
        tracing::info!(dish = %recipe.dish(), lines = recipe.len(), "recipe set");
        Ok(recipe)
    }

    /// Parse `name:quantity` lines and set the result; a bad line rejects
    /// the whole text before anything is written.
    pub async fn set_recipe_from_text(&self, dish: &str, text: &str) -> ServiceResult<Recipe> {
        let recipe = Recipe::parse_text(dish, text)?;
        self.set_recipe(recipe).await
    }

    pub async fn get_recipe(&self, dish: &DishName) -> ServiceResult<Option<Recipe>> {
        tracing::debug!(%dish, "recipe lookup");
        Ok(self.store.recipe(dish).await?)
    }

    pub async fn list_dishes(&self) -> ServiceResult<Vec<DishName>> {
        Ok(self.store.dishes().await?)
    }
}
