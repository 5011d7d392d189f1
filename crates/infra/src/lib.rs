//! Infrastructure layer: persistence, component services, sessions, config.

pub mod config;
pub mod error;
pub mod kitchen;
pub mod services;
pub mod sessions;
pub mod store;

mod integration_tests;

pub use config::{AppConfig, ConfigError};
pub use error::{ServeFailure, ServiceError, ServiceResult, StoreError, StoreResult};
pub use kitchen::Kitchen;
pub use sessions::{InMemorySessionStore, SessionManager, SessionStore};
pub use store::{InMemoryKitchenStore, KitchenStore, SqliteKitchenStore};
