use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "stock.write").
/// A special wildcard permission `"*"` is granted to admins to indicate
/// "allow all" without enumerating every operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission::from_static("*");

    /// Restock an ingredient (add or replace its quantity).
    pub const STOCK_WRITE: Permission = Permission::from_static("stock.write");
    /// Read current stock levels.
    pub const STOCK_READ: Permission = Permission::from_static("stock.read");
    /// Read the stock movement log.
    pub const STOCK_HISTORY: Permission = Permission::from_static("stock.history");
    /// Low-stock alerts and serving reports.
    pub const REPORTS_READ: Permission = Permission::from_static("reports.read");
    /// Create or replace a dish recipe.
    pub const RECIPES_WRITE: Permission = Permission::from_static("recipes.write");
    pub const RECIPES_READ: Permission = Permission::from_static("recipes.read");
    pub const DISHES_LIST: Permission = Permission::from_static("dishes.list");
    /// Serve one portion of a dish.
    pub const DISHES_SERVE: Permission = Permission::from_static("dishes.serve");
    /// Create or replace user accounts.
    pub const USERS_MANAGE: Permission = Permission::from_static("users.manage");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
