//! Infrastructure wiring: config → store → kitchen.

use thiserror::Error;

use galley_infra::{AppConfig, Kitchen, ServiceError, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open kitchen store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to seed default users: {0}")]
    Seed(#[from] ServiceError),
}

/// Shared services handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    pub kitchen: Kitchen,
}

/// Open the configured store, wire the kitchen and seed default accounts
/// when enabled.
pub async fn build_services(config: AppConfig) -> Result<AppServices, StartupError> {
    let kitchen = Kitchen::open(&config).await?;

    if config.seed_default_users {
        let created = kitchen.seed_default_users().await?;
        tracing::info!(created, "default accounts checked");
    }

    Ok(AppServices { kitchen })
}
