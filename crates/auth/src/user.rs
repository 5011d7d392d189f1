//! User accounts and password credentials.
//!
//! Passwords are stored as argon2 PHC strings; the plaintext secret never
//! leaves [`NewAccount`].

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use galley_core::{DomainResult, validation};

use crate::{Principal, Role};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl UserAccount {
    /// Check a plaintext password against the stored hash.
    ///
    /// A mismatch is `Ok(false)`; only a corrupt hash is an error.
    pub fn verify_password(&self, password: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(&self.password_hash)
            .map_err(|e| CredentialError::MalformedHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.username.clone(), self.role)
    }
}

/// Validated registration input, not yet hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    username: String,
    password: String,
    role: Role,
}

impl NewAccount {
    pub fn new(username: &str, password: &str, role: Role) -> DomainResult<Self> {
        let username = validation::validate_username(username)?;
        validation::validate_password(password)?;
        Ok(Self {
            username,
            password: password.to_string(),
            role,
        })
    }

    /// Parse form input where the role arrives as text.
    pub fn parse(username: &str, password: &str, role: &str) -> DomainResult<Self> {
        let role: Role = role.parse()?;
        Self::new(username, password, role)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Hash the password with a fresh random salt.
    pub fn into_account(self) -> Result<UserAccount, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(self.password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?
            .to_string();
        Ok(UserAccount {
            username: self.username,
            password_hash: hash,
            role: self.role,
        })
    }
}

/// Accounts inserted on first start so a fresh kitchen can log in.
pub fn default_accounts() -> Vec<(&'static str, &'static str, Role)> {
    vec![
        ("admin1", "admin123", Role::Admin),
        ("cook1", "cook123", Role::Cook),
        ("manager1", "manager123", Role::Manager),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_account_verifies_only_the_original_password() {
        let account = NewAccount::new("cook1", "cook123", Role::Cook)
            .unwrap()
            .into_account()
            .unwrap();
        assert_ne!(account.password_hash, "cook123");
        assert!(account.verify_password("cook123").unwrap());
        assert!(!account.verify_password("cook124").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let account = UserAccount {
            username: "ghost".to_string(),
            password_hash: "plaintext".to_string(),
            role: Role::Cook,
        };
        assert!(matches!(
            account.verify_password("plaintext"),
            Err(CredentialError::MalformedHash(_))
        ));
    }

    #[test]
    fn registration_rejects_bad_input() {
        assert!(NewAccount::parse("cook 2", "secret1", "cook").is_err());
        assert!(NewAccount::parse("cook2", "short", "cook").is_err());
        assert!(NewAccount::parse("cook2", "secret1", "chef").is_err());
        assert_eq!(
            NewAccount::parse("cook2", "secret1", "cook").unwrap().role(),
            Role::Cook
        );
    }

    #[test]
    fn default_accounts_satisfy_registration_rules() {
        for (username, password, role) in default_accounts() {
            assert!(NewAccount::new(username, password, role).is_ok(), "{username}");
        }
    }
}
