use serde::{Deserialize, Serialize};

use crate::Role;

/// An authenticated user acting on the kitchen.
///
/// Construction is decoupled from storage and transport: the API derives it
/// from a session and the account directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    username: String,
    role: Role,
}

impl Principal {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Actor name recorded on movement records and serving events.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
