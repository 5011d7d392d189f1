//! SQLite-backed kitchen store.
//!
//! The pool holds exactly one long-lived connection. Every transaction
//! therefore runs alone, which is what makes the serve check-and-deduct
//! atomic; the guarded `UPDATE` and the `CHECK (quantity >= 0)` constraint
//! keep stock non-negative even if that ever changes.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};

use galley_auth::{Role, UserAccount};
use galley_core::{DishName, DomainError, IngredientName, MovementId, ServingId, StockDate};
use galley_inventory::{
    MovementKind, NOT_ENOUGH_FOR_ONE_PORTION, NewMovement, NewServing, Recipe, ServingEvent,
    ServingReceipt, StockEntry, StockLevels, StockMovement, plan_portion, require_recipe,
};

use super::KitchenStore;
use crate::error::{ServeFailure, StoreError, StoreResult};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS stock (
        name       TEXT PRIMARY KEY,
        quantity   INTEGER NOT NULL CHECK (quantity >= 0),
        updated_on TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dishes (
        name TEXT PRIMARY KEY
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recipe_lines (
        dish       TEXT NOT NULL REFERENCES dishes(name) ON DELETE CASCADE,
        ingredient TEXT NOT NULL,
        quantity   INTEGER NOT NULL CHECK (quantity > 0),
        PRIMARY KEY (dish, ingredient)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stock_movements (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        ingredient  TEXT NOT NULL,
        quantity    INTEGER NOT NULL,
        kind        TEXT NOT NULL,
        occurred_at TEXT NOT NULL,
        actor       TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS servings (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        dish      TEXT NOT NULL,
        served_at TEXT NOT NULL,
        actor     TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        username      TEXT PRIMARY KEY,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL
    )
    "#,
];

#[derive(Debug, Clone)]
pub struct SqliteKitchenStore {
    pool: SqlitePool,
}

impl SqliteKitchenStore {
    /// Open (creating if missing) the database at `url` and apply the schema.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database; lives as long as the store.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("sqlite kitchen schema applied");
        Ok(())
    }
}

fn parse_timestamp(raw: &str, what: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::corrupt(format!("invalid {what} '{raw}': {e}")))
}

fn corrupt(table: &str) -> impl Fn(DomainError) -> StoreError + '_ {
    move |e| StoreError::corrupt(format!("{table}: {e}"))
}

fn row_to_stock(row: SqliteRow) -> StoreResult<StockEntry> {
    let name: String = row.try_get("name")?;
    let updated_on: String = row.try_get("updated_on")?;
    Ok(StockEntry {
        ingredient: IngredientName::parse(&name).map_err(corrupt("stock"))?,
        quantity: row.try_get("quantity")?,
        updated_on: StockDate::parse(&updated_on).map_err(corrupt("stock"))?,
    })
}

fn row_to_movement(row: SqliteRow) -> StoreResult<StockMovement> {
    let ingredient: String = row.try_get("ingredient")?;
    let kind: String = row.try_get("kind")?;
    let occurred_at: String = row.try_get("occurred_at")?;
    Ok(StockMovement {
        id: MovementId::new(row.try_get("id")?),
        ingredient: IngredientName::parse(&ingredient).map_err(corrupt("stock_movements"))?,
        quantity: row.try_get("quantity")?,
        kind: MovementKind::parse(&kind).map_err(corrupt("stock_movements"))?,
        occurred_at: parse_timestamp(&occurred_at, "occurred_at")?,
        actor: row.try_get("actor")?,
    })
}

fn row_to_serving(row: SqliteRow) -> StoreResult<ServingEvent> {
    let dish: String = row.try_get("dish")?;
    let served_at: String = row.try_get("served_at")?;
    Ok(ServingEvent {
        id: ServingId::new(row.try_get("id")?),
        dish: DishName::parse(&dish).map_err(corrupt("servings"))?,
        served_at: parse_timestamp(&served_at, "served_at")?,
        actor: row.try_get("actor")?,
    })
}

fn row_to_account(row: SqliteRow) -> StoreResult<UserAccount> {
    let role: String = row.try_get("role")?;
    Ok(UserAccount {
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse::<Role>().map_err(corrupt("users"))?,
    })
}

async fn insert_movement(conn: &mut SqliteConnection, movement: NewMovement) -> StoreResult<StockMovement> {
    let result = sqlx::query(
        r#"
        INSERT INTO stock_movements (ingredient, quantity, kind, occurred_at, actor)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(movement.ingredient.as_str())
    .bind(movement.quantity)
    .bind(movement.kind.as_str())
    .bind(movement.occurred_at.to_rfc3339())
    .bind(&movement.actor)
    .execute(&mut *conn)
    .await?;

    Ok(movement.commit(MovementId::new(result.last_insert_rowid())))
}

async fn insert_serving(conn: &mut SqliteConnection, serving: NewServing) -> StoreResult<ServingEvent> {
    let result = sqlx::query("INSERT INTO servings (dish, served_at, actor) VALUES (?1, ?2, ?3)")
        .bind(serving.dish.as_str())
        .bind(serving.served_at.to_rfc3339())
        .bind(&serving.actor)
        .execute(&mut *conn)
        .await?;

    Ok(serving.commit(ServingId::new(result.last_insert_rowid())))
}

async fn load_recipe(conn: &mut SqliteConnection, dish: &DishName) -> StoreResult<Option<Recipe>> {
    let rows = sqlx::query(
        r#"
        SELECT ingredient, quantity
        FROM recipe_lines
        WHERE dish = ?1
        ORDER BY ingredient
        "#,
    )
    .bind(dish.as_str())
    .fetch_all(&mut *conn)
    .await?;

    if rows.is_empty() {
        return Ok(None);
    }

    let mut lines = BTreeMap::new();
    for row in rows {
        let ingredient: String = row.try_get("ingredient")?;
        lines.insert(
            IngredientName::parse(&ingredient).map_err(corrupt("recipe_lines"))?,
            row.try_get::<i64, _>("quantity")?,
        );
    }
    Recipe::new(dish.clone(), lines)
        .map(Some)
        .map_err(corrupt("recipe_lines"))
}

async fn load_levels(conn: &mut SqliteConnection, recipe: &Recipe) -> StoreResult<StockLevels> {
    let mut levels = StockLevels::new();
    for ingredient in recipe.ingredients() {
        let row = sqlx::query("SELECT quantity FROM stock WHERE name = ?1")
            .bind(ingredient.as_str())
            .fetch_optional(&mut *conn)
            .await?;
        if let Some(row) = row {
            levels.insert(ingredient.clone(), row.try_get("quantity")?);
        }
    }
    Ok(levels)
}

#[async_trait]
impl KitchenStore for SqliteKitchenStore {
    async fn restock(&self, entry: StockEntry, movement: NewMovement) -> StoreResult<StockMovement> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO stock (name, quantity, updated_on)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET
                quantity = excluded.quantity,
                updated_on = excluded.updated_on
            "#,
        )
        .bind(entry.ingredient.as_str())
        .bind(entry.quantity)
        .bind(entry.updated_on.to_string())
        .execute(&mut *tx)
        .await?;

        let movement = insert_movement(&mut tx, movement).await?;
        tx.commit().await?;
        Ok(movement)
    }

    async fn stock_entry(&self, ingredient: &IngredientName) -> StoreResult<Option<StockEntry>> {
        sqlx::query("SELECT name, quantity, updated_on FROM stock WHERE name = ?1")
            .bind(ingredient.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_stock)
            .transpose()
    }

    async fn stock_entries(&self) -> StoreResult<Vec<StockEntry>> {
        sqlx::query("SELECT name, quantity, updated_on FROM stock ORDER BY name")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(row_to_stock)
            .collect()
    }

    async fn movements(&self) -> StoreResult<Vec<StockMovement>> {
        sqlx::query(
            r#"
            SELECT id, ingredient, quantity, kind, occurred_at, actor
            FROM stock_movements
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(row_to_movement)
        .collect()
    }

    async fn put_recipe(&self, recipe: &Recipe) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let dish = recipe.dish().as_str();

        sqlx::query("INSERT INTO dishes (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
            .bind(dish)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_lines WHERE dish = ?1")
            .bind(dish)
            .execute(&mut *tx)
            .await?;
        for (ingredient, quantity) in recipe.lines() {
            sqlx::query("INSERT INTO recipe_lines (dish, ingredient, quantity) VALUES (?1, ?2, ?3)")
                .bind(dish)
                .bind(ingredient.as_str())
                .bind(*quantity)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn recipe(&self, dish: &DishName) -> StoreResult<Option<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        load_recipe(&mut conn, dish).await
    }

    async fn dishes(&self) -> StoreResult<Vec<DishName>> {
        let rows = sqlx::query("SELECT name FROM dishes ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let name: String = row.try_get("name")?;
                DishName::parse(&name).map_err(corrupt("dishes"))
            })
            .collect()
    }

    async fn serve_portion(
        &self,
        dish: &DishName,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<ServingReceipt, ServeFailure> {
        let mut tx = self.pool.begin().await?;

        let recipe = require_recipe(dish, load_recipe(&mut tx, dish).await?)?;
        let levels = load_levels(&mut tx, &recipe).await?;
        let plan = plan_portion(&recipe, &levels)?;

        for (ingredient, quantity) in plan.deductions() {
            let result = sqlx::query(
                "UPDATE stock SET quantity = quantity - ?1 WHERE name = ?2 AND quantity >= ?1",
            )
            .bind(*quantity)
            .bind(ingredient.as_str())
            .execute(&mut *tx)
            .await?;

            // Dropping `tx` rolls back any deductions already applied.
            if result.rows_affected() != 1 {
                return Err(ServeFailure::Rejected(DomainError::insufficient_stock(vec![
                    NOT_ENOUGH_FOR_ONE_PORTION.to_string(),
                ])));
            }
        }

        let mut movements = Vec::with_capacity(plan.deductions().len());
        for movement in plan.movements(actor, at) {
            movements.push(insert_movement(&mut tx, movement).await?);
        }
        let serving = insert_serving(&mut tx, plan.serving(actor, at)).await?;

        tx.commit().await?;
        Ok(ServingReceipt { serving, movements })
    }

    async fn servings(&self) -> StoreResult<Vec<ServingEvent>> {
        sqlx::query("SELECT id, dish, served_at, actor FROM servings ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(row_to_serving)
            .collect()
    }

    async fn put_account(&self, account: &UserAccount) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(username) DO UPDATE SET
                password_hash = excluded.password_hash,
                role = excluded.role
            "#,
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_account_if_absent(&self, account: &UserAccount) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(username) DO NOTHING
            "#,
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn account(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        sqlx::query("SELECT username, password_hash, role FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_account)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_rejects_negative_stock() {
        let store = SqliteKitchenStore::in_memory().await.unwrap();
        let err = sqlx::query("INSERT INTO stock (name, quantity, updated_on) VALUES ('salt', -1, '2024-01-01')")
            .execute(&store.pool)
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn corrupt_rows_surface_as_store_errors() {
        let store = SqliteKitchenStore::in_memory().await.unwrap();
        sqlx::query("INSERT INTO stock (name, quantity, updated_on) VALUES ('bad-name!', 1, '2024-01-01')")
            .execute(&store.pool)
            .await
            .unwrap();
        let err = store.stock_entries().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
