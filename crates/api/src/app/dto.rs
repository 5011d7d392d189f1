use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use galley_auth::{Principal, Role, Session, role_permissions};
use galley_core::{DishName, IngredientName, ServingId};
use galley_inventory::{Recipe, ServingReceipt, StockMovement};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A form field that may arrive as JSON text or as a number.
///
/// Fractional numbers are kept so that quantity validation, not
/// deserialization, rejects them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FormField {
    Text(String),
    Number(i64),
    Decimal(f64),
}

impl Default for FormField {
    fn default() -> Self {
        FormField::Text(String::new())
    }
}

impl FormField {
    pub fn into_text(self) -> String {
        match self {
            FormField::Text(s) => s,
            FormField::Number(n) => n.to_string(),
            FormField::Decimal(n) => format!("{n:?}"),
        }
    }
}

/// Manual restock. Every field keeps form semantics: missing fields are
/// blank and rejected by validation, not by deserialization.
#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: FormField,
    #[serde(default)]
    pub date: String,
}

/// Either a structured mapping or the `name:quantity` text format.
#[derive(Debug, Deserialize)]
pub struct SetRecipeRequest {
    pub ingredients: Option<BTreeMap<String, FormField>>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl LoginResponse {
    pub fn new(session: &Session, principal: &Principal) -> Self {
        Self {
            token: session.token.as_str().to_string(),
            username: principal.username().to_string(),
            role: principal.role(),
            expires_at: session.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub username: String,
    pub role: Role,
    pub permissions: Vec<String>,
}

impl From<&Principal> for PrincipalResponse {
    fn from(p: &Principal) -> Self {
        Self {
            username: p.username().to_string(),
            role: p.role(),
            permissions: role_permissions(p.role())
                .iter()
                .map(|perm| perm.as_str().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub dish: DishName,
    pub ingredients: BTreeMap<IngredientName, i64>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            dish: recipe.dish().clone(),
            ingredients: recipe.into_lines(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServeResponse {
    pub serving_id: ServingId,
    pub dish: DishName,
    pub portions_served: u32,
    pub served_at: DateTime<Utc>,
    pub deductions: Vec<StockMovement>,
}

impl From<ServingReceipt> for ServeResponse {
    fn from(receipt: ServingReceipt) -> Self {
        Self {
            portions_served: receipt.portions_served(),
            serving_id: receipt.serving.id,
            dish: receipt.serving.dish,
            served_at: receipt.serving.served_at,
            deductions: receipt.movements,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LowStockResponse {
    pub threshold: i64,
    pub alerts: Vec<LowStockAlertDto>,
}

#[derive(Debug, Serialize)]
pub struct LowStockAlertDto {
    pub ingredient: IngredientName,
    pub quantity: i64,
    pub message: String,
}

impl From<galley_inventory::LowStockAlert> for LowStockAlertDto {
    fn from(alert: galley_inventory::LowStockAlert) -> Self {
        Self {
            message: alert.to_string(),
            ingredient: alert.ingredient,
            quantity: alert.quantity,
        }
    }
}
