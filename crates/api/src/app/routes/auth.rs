use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};

use crate::app::{dto, errors, extract::ValidJson, services::AppServices};
use crate::context::PrincipalContext;
use crate::middleware::SESSION_COOKIE;

/// POST /login - exchange credentials for a session token.
///
/// The token is returned in the body and as an `HttpOnly` cookie.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(body): ValidJson<dto::LoginRequest>,
) -> axum::response::Response {
    let Some((session, principal)) = services
        .kitchen
        .login(body.username.trim(), &body.password)
        .await
    else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "invalid username or password",
        );
    };

    let cookie = format!(
        "{SESSION_COOKIE}={}; HttpOnly; Path=/; SameSite=Strict; Max-Age={}",
        session.token,
        services.kitchen.sessions().ttl().num_seconds()
    );

    let mut response = (StatusCode::OK, Json(dto::LoginResponse::new(&session, &principal))).into_response();
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "session cookie not set"),
    }
    response
}

/// POST /logout - revoke the session that made the request.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    services.kitchen.logout(principal.token());
    tracing::info!(username = principal.username(), "logout");

    let clear = format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Strict; Max-Age=0");
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear)],
    )
        .into_response()
}
