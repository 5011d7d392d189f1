use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use galley_auth::role_definitions;

use crate::app::dto::PrincipalResponse;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(PrincipalResponse::from(principal.principal()))
}

/// GET /roles - the static role table, for any signed-in user.
pub async fn list_roles() -> impl IntoResponse {
    Json(serde_json::json!({ "roles": role_definitions() }))
}
