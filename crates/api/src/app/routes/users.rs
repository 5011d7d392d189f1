use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::{dto, errors, extract::ValidJson, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", post(register_user))
}

/// POST /users - create or replace an account (admin only).
pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidJson(body): ValidJson<dto::RegisterUserRequest>,
) -> axum::response::Response {
    match services
        .kitchen
        .register_user(principal.principal(), &body.username, &body.password, &body.role)
        .await
    {
        Ok(created) => (StatusCode::CREATED, Json(dto::PrincipalResponse::from(&created))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
