use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod dishes;
pub mod reports;
pub mod stock;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/roles", get(system::list_roles))
        .route("/logout", post(auth::logout))
        .route("/movements", get(stock::stock_history))
        .nest("/stock", stock::router())
        .nest("/dishes", dishes::router())
        .nest("/reports", reports::router())
        .nest("/users", users::router())
}
