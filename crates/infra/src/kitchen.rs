//! The authorizing facade over the kitchen services.
//!
//! Every operation takes the acting [`Principal`], checks the role policy
//! first and only then validates input and touches storage. Callers (the
//! HTTP API, tests) never reach a service without going through here.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use galley_auth::{NewAccount, Permission, Principal, Session, SessionToken, authorize};
use galley_core::{DishName, DomainResult, IngredientName, validation};
use galley_inventory::{
    LowStockAlert, Recipe, Restock, ServingEvent, ServingReceipt, StockEntry, StockMovement,
};

use crate::config::AppConfig;
use crate::error::{ServiceResult, StoreResult};
use crate::services::{AccountDirectory, RecipeCatalog, Reporting, ServingWorkflow, StockLedger};
use crate::sessions::SessionManager;
use crate::store::{self, KitchenStore};

#[derive(Clone)]
pub struct Kitchen {
    ledger: StockLedger,
    catalog: RecipeCatalog,
    serving: ServingWorkflow,
    reporting: Reporting,
    accounts: AccountDirectory,
    sessions: SessionManager,
}

impl Kitchen {
    /// Wire every service onto one injected store.
    pub fn new(store: Arc<dyn KitchenStore>, config: &AppConfig) -> Self {
        Self {
            ledger: StockLedger::new(store.clone()),
            catalog: RecipeCatalog::new(store.clone()),
            serving: ServingWorkflow::new(store.clone()),
            reporting: Reporting::with_threshold(store.clone(), config.low_stock_threshold),
            accounts: AccountDirectory::new(store),
            sessions: SessionManager::in_memory(config.session_ttl()),
        }
    }

    /// Open the configured store and wire the services onto it.
    pub async fn open(config: &AppConfig) -> StoreResult<Self> {
        let store = store::open(config).await?;
        Ok(Self::new(store, config))
    }

    pub fn accounts(&self) -> &AccountDirectory {
        &self.accounts
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Threshold used by [`Kitchen::low_stock`] when none is given.
    pub fn low_stock_threshold(&self) -> i64 {
        self.reporting.threshold()
    }

    // --- sessions ---

    /// Check credentials and open a session.
    pub async fn login(&self, username: &str, password: &str) -> Option<(Session, Principal)> {
        let principal = self.accounts.authenticate(username, password).await?;
        let session = self.sessions.issue(principal.username(), Utc::now());
        tracing::info!(username = principal.username(), role = %principal.role(), "login");
        Some((session, principal))
    }

    /// Principal behind a session token, with the role as currently stored.
    ///
    /// A live token whose account is gone or unreadable resolves to `None`.
    pub async fn resolve_session(&self, token: &SessionToken) -> Option<Principal> {
        let session = self.sessions.resolve(token, Utc::now())?;
        match self.accounts.principal(&session.username).await {
            Ok(principal) => principal,
            Err(e) => {
                tracing::warn!(username = %session.username, error = %e, "account lookup failed; treating as unauthenticated");
                None
            }
        }
    }

    pub fn logout(&self, token: &SessionToken) -> bool {
        self.sessions.revoke(token)
    }

    // --- stock ledger ---

    pub async fn add_stock(
        &self,
        principal: &Principal,
        name: &str,
        quantity: &str,
        date: &str,
    ) -> ServiceResult<StockMovement> {
        guard(principal, &Permission::STOCK_WRITE)?;
        let restock = Restock::parse(name, quantity, date)?;
        self.ledger.add_or_replace(restock, principal.username()).await
    }

    pub async fn stock_entry(&self, principal: &Principal, name: &str) -> ServiceResult<Option<StockEntry>> {
        guard(principal, &Permission::STOCK_READ)?;
        let ingredient = IngredientName::parse(name)?;
        self.ledger.get(&ingredient).await
    }

    pub async fn list_stock(&self, principal: &Principal) -> ServiceResult<Vec<StockEntry>> {
        guard(principal, &Permission::STOCK_READ)?;
        self.ledger.list_all().await
    }

    pub async fn stock_history(&self, principal: &Principal) -> ServiceResult<Vec<StockMovement>> {
        guard(principal, &Permission::STOCK_HISTORY)?;
        self.ledger.history().await
    }

    // --- recipe catalog ---

    pub async fn list_dishes(&self, principal: &Principal) -> ServiceResult<Vec<DishName>> {
        guard(principal, &Permission::DISHES_LIST)?;
        self.catalog.list_dishes().await
    }

    /// Replace a recipe from `ingredient -> quantity` form fields.
    pub async fn set_recipe(
        &self,
        principal: &Principal,
        dish: &str,
        ingredients: &BTreeMap<String, String>,
    ) -> ServiceResult<Recipe> {
        guard(principal, &Permission::RECIPES_WRITE)?;
        let pairs = ingredients
            .iter()
            .map(|(name, quantity)| {
                validation::parse_quantity(name.trim(), quantity).map(|q| (name.as_str(), q))
            })
            .collect::<DomainResult<Vec<_>>>()?;
        let recipe = Recipe::from_pairs(dish, pairs)?;
        self.catalog.set_recipe(recipe).await
    }

    pub async fn set_recipe_text(&self, principal: &Principal, dish: &str, text: &str) -> ServiceResult<Recipe> {
        guard(principal, &Permission::RECIPES_WRITE)?;
        self.catalog.set_recipe_from_text(dish, text).await
    }

    pub async fn recipe(&self, principal: &Principal, dish: &str) -> ServiceResult<Option<Recipe>> {
        guard(principal, &Permission::RECIPES_READ)?;
        let dish = DishName::parse(dish)?;
        self.catalog.get_recipe(&dish).await
    }

    // --- serving ---

    pub async fn serve(&self, principal: &Principal, dish: &str) -> ServiceResult<ServingReceipt> {
        guard(principal, &Permission::DISHES_SERVE)?;
        let dish = DishName::parse(dish)?;
        self.serving.serve(&dish, principal.username()).await
    }

    // --- reporting ---

    /// Low-stock alerts below `threshold`, or the configured default.
    pub async fn low_stock(&self, principal: &Principal, threshold: Option<i64>) -> ServiceResult<Vec<LowStockAlert>> {
        guard(principal, &Permission::REPORTS_READ)?;
        match threshold {
            Some(t) => self.reporting.low_stock_below(t).await,
            None => self.reporting.low_stock().await,
        }
    }

    pub async fn serving_counts(&self, principal: &Principal) -> ServiceResult<BTreeMap<DishName, u64>> {
        guard(principal, &Permission::REPORTS_READ)?;
        self.reporting.serving_counts().await
    }

    pub async fn serving_history(&self, principal: &Principal) -> ServiceResult<Vec<ServingEvent>> {
        guard(principal, &Permission::REPORTS_READ)?;
        self.reporting.serving_history().await
    }

    // --- users ---

    pub async fn register_user(
        &self,
        principal: &Principal,
        username: &str,
        password: &str,
        role: &str,
    ) -> ServiceResult<Principal> {
        guard(principal, &Permission::USERS_MANAGE)?;
        let account = NewAccount::parse(username, password, role)?;
        self.accounts.register(account).await
    }

    pub async fn seed_default_users(&self) -> ServiceResult<usize> {
        self.accounts.seed_defaults().await
    }
}

fn guard(principal: &Principal, required: &Permission) -> ServiceResult<()> {
    authorize(principal, required).map_err(|e| {
        tracing::warn!(
            username = principal.username(),
            role = %principal.role(),
            permission = required.as_str(),
            "permission denied"
        );
        e.into()
    })
}
