use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use galley_auth::UserAccount;
use galley_core::{DishName, IngredientName, MovementId, ServingId};
use galley_inventory::{
    NewMovement, Recipe, ServingEvent, ServingReceipt, StockEntry, StockLevels, StockMovement,
    plan_portion, require_recipe,
};

use super::KitchenStore;
use crate::error::{ServeFailure, StoreError, StoreResult};

#[derive(Debug)]
struct State {
    stock: BTreeMap<IngredientName, StockEntry>,
    movements: Vec<StockMovement>,
    recipes: BTreeMap<DishName, Recipe>,
    servings: Vec<ServingEvent>,
    accounts: HashMap<String, UserAccount>,
    next_movement: MovementId,
    next_serving: ServingId,
}

impl Default for State {
    fn default() -> Self {
        Self {
            stock: BTreeMap::new(),
            movements: Vec::new(),
            recipes: BTreeMap::new(),
            servings: Vec::new(),
            accounts: HashMap::new(),
            next_movement: MovementId::new(1),
            next_serving: ServingId::new(1),
        }
    }
}

impl State {
    fn append_movement(&mut self, movement: NewMovement) -> StockMovement {
        let id = self.next_movement;
        self.next_movement = id.next();
        let committed = movement.commit(id);
        self.movements.push(committed.clone());
        committed
    }
}

/// In-memory store for tests/dev.
///
/// The whole state sits behind one mutex, so every operation (including the
/// serve check-and-deduct) is atomic with respect to every other.
#[derive(Debug, Default)]
pub struct InMemoryKitchenStore {
    inner: Mutex<State>,
}

impl InMemoryKitchenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KitchenStore for InMemoryKitchenStore {
    async fn restock(&self, entry: StockEntry, movement: NewMovement) -> StoreResult<StockMovement> {
        let mut state = self.lock()?;
        state.stock.insert(entry.ingredient.clone(), entry);
        Ok(state.append_movement(movement))
    }

    async fn stock_entry(&self, ingredient: &IngredientName) -> StoreResult<Option<StockEntry>> {
        Ok(self.lock()?.stock.get(ingredient).cloned())
    }

    async fn stock_entries(&self) -> StoreResult<Vec<StockEntry>> {
        Ok(self.lock()?.stock.values().cloned().collect())
    }

    async fn movements(&self) -> StoreResult<Vec<StockMovement>> {
        Ok(self.lock()?.movements.clone())
    }

    async fn put_recipe(&self, recipe: &Recipe) -> StoreResult<()> {
        self.lock()?
            .recipes
            .insert(recipe.dish().clone(), recipe.clone());
        Ok(())
    }

    async fn recipe(&self, dish: &DishName) -> StoreResult<Option<Recipe>> {
        Ok(self.lock()?.recipes.get(dish).cloned())
    }

    async fn dishes(&self) -> StoreResult<Vec<DishName>> {
        Ok(self.lock()?.recipes.keys().cloned().collect())
    }

    async fn serve_portion(
        &self,
        dish: &DishName,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<ServingReceipt, ServeFailure> {
        let mut state = self.lock()?;

        let recipe = require_recipe(dish, state.recipes.get(dish).cloned())?;
        let levels: StockLevels = recipe
            .ingredients()
            .filter_map(|i| state.stock.get(i).map(|e| (i.clone(), e.quantity)))
            .collect();
        let plan = plan_portion(&recipe, &levels)?;

        // Sufficiency was checked under the same guard; deductions cannot fail.
        for (ingredient, quantity) in plan.deductions() {
            if let Some(entry) = state.stock.get_mut(ingredient) {
                entry.quantity -= quantity;
            }
        }
        let movements = plan
            .movements(actor, at)
            .into_iter()
            .map(|m| state.append_movement(m))
            .collect();

        let id = state.next_serving;
        state.next_serving = id.next();
        let serving = plan.serving(actor, at).commit(id);
        state.servings.push(serving.clone());

        Ok(ServingReceipt { serving, movements })
    }

    async fn servings(&self) -> StoreResult<Vec<ServingEvent>> {
        Ok(self.lock()?.servings.clone())
    }

    async fn put_account(&self, account: &UserAccount) -> StoreResult<()> {
        self.lock()?
            .accounts
            .insert(account.username.clone(), account.clone());
        Ok(())
    }

    async fn insert_account_if_absent(&self, account: &UserAccount) -> StoreResult<bool> {
        let mut state = self.lock()?;
        if state.accounts.contains_key(&account.username) {
            return Ok(false);
        }
        state
            .accounts
            .insert(account.username.clone(), account.clone());
        Ok(true)
    }

    async fn account(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self.lock()?.accounts.get(username).cloned())
    }
}
