use std::sync::Arc;

use galley_auth::{CredentialError, NewAccount, Principal, UserAccount, default_accounts};

use crate::error::{ServiceError, ServiceResult};
use crate::store::KitchenStore;

/// User accounts: credential checks, registration, role lookup.
#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn KitchenStore>,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn KitchenStore>) -> Self {
        Self { store }
    }

    /// Verify a username/password pair.
    ///
    /// Any failure to look up or check the credential is logged and reported
    /// as unauthenticated.
    pub async fn authenticate(&self, username: &str, password: &str) -> Option<Principal> {
        let account = match self.store.account(username).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::warn!(username, "login for unknown user");
                return None;
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "credential lookup failed; treating as unauthenticated");
                return None;
            }
        };

        let password = password.to_string();
        let checked = tokio::task::spawn_blocking(move || {
            let ok = account.verify_password(&password)?;
            Ok::<_, CredentialError>(ok.then(|| account.principal()))
        })
        .await;

        match checked {
            Ok(Ok(Some(principal))) => Some(principal),
            Ok(Ok(None)) => {
                tracing::warn!(username, "login with wrong password");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(username, error = %e, "stored credential unusable; treating as unauthenticated");
                None
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "credential check aborted");
                None
            }
        }
    }

    /// Create or replace an account.
    pub async fn register(&self, account: NewAccount) -> ServiceResult<Principal> {
        let account = hash(account).await?;
        self.store.put_account(&account).await?;
        tracing::info!(username = %account.username, role = %account.role, "account registered");
        Ok(account.principal())
    }

    /// Insert the default accounts that do not exist yet. Returns how many
    /// were created.
    pub async fn seed_defaults(&self) -> ServiceResult<usize> {
        let mut created = 0;
        for (username, password, role) in default_accounts() {
            let account = hash(NewAccount::new(username, password, role)?).await?;
            if self.store.insert_account_if_absent(&account).await? {
                tracing::info!(username, %role, "seeded default account");
                created += 1;
            }
        }
        Ok(created)
    }

    /// Current principal for `username`, read fresh so role changes apply
    /// to existing sessions.
    pub async fn principal(&self, username: &str) -> ServiceResult<Option<Principal>> {
        Ok(self
            .store
            .account(username)
            .await?
            .map(|a| a.principal()))
    }
}

async fn hash(account: NewAccount) -> ServiceResult<UserAccount> {
    tokio::task::spawn_blocking(move || account.into_account())
        .await
        .map_err(|e| ServiceError::Internal(format!("password hashing aborted: {e}")))?
        .map_err(ServiceError::from)
}
