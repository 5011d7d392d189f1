use serde::Serialize;
use thiserror::Error;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("permission denied: role '{role}' lacks '{permission}'")]
    Forbidden { role: Role, permission: String },
}

/// Static role→permission table.
///
/// - admin: everything (wildcard)
/// - manager: stock management, stock history and reports
/// - cook: list and serve dishes
pub fn role_permissions(role: Role) -> &'static [Permission] {
    const ADMIN: &[Permission] = &[Permission::WILDCARD];
    const MANAGER: &[Permission] = &[
        Permission::STOCK_WRITE,
        Permission::STOCK_READ,
        Permission::STOCK_HISTORY,
        Permission::REPORTS_READ,
    ];
    const COOK: &[Permission] = &[Permission::DISHES_LIST, Permission::DISHES_SERVE];

    match role {
        Role::Admin => ADMIN,
        Role::Manager => MANAGER,
        Role::Cook => COOK,
    }
}

/// Pure policy check: does `role` hold `required`?
pub fn is_allowed(role: Role, required: &Permission) -> bool {
    role_permissions(role)
        .iter()
        .any(|p| p.is_wildcard() || p == required)
}

/// Authorize a principal for one operation.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if is_allowed(principal.role(), required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: principal.role(),
            permission: required.as_str().to_string(),
        })
    }
}

/// Role definition with its granted permissions (for display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub permissions: Vec<String>,
    pub description: &'static str,
}

/// All roles with their permissions, in a stable order.
pub fn role_definitions() -> Vec<RoleDefinition> {
    Role::ALL
        .iter()
        .map(|&role| RoleDefinition {
            role,
            permissions: role_permissions(role)
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            description: role_description(role),
        })
        .collect()
}

fn role_description(role: Role) -> &'static str {
    match role {
        Role::Admin => "Full access, including recipes and user accounts",
        Role::Manager => "Restocks ingredients and reads stock history and reports",
        Role::Cook => "Lists dishes and serves portions",
    }
}
