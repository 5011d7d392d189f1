//! `galley-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{AuthzError, authorize, is_allowed, role_definitions, role_permissions};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
pub use session::{Session, SessionToken, SessionValidationError, validate_session};
pub use user::{CredentialError, NewAccount, UserAccount, default_accounts};
