use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};

use galley_auth::SessionToken;
use galley_infra::Kitchen;

use crate::app::errors;
use crate::context::PrincipalContext;

/// Name of the cookie set by `/login`.
pub const SESSION_COOKIE: &str = "galley_session";

#[derive(Clone)]
pub struct AuthState {
    pub kitchen: Kitchen,
}

/// Resolve the session token (bearer header or cookie) to a principal.
///
/// Missing, unknown or expired tokens, and tokens whose account no longer
/// exists, are all `401`.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(req.headers()) else {
        return unauthorized();
    };

    let Some(principal) = state.kitchen.resolve_session(&token).await else {
        return unauthorized();
    };

    req.extensions_mut()
        .insert(PrincipalContext::new(principal, token));

    next.run(req).await
}

fn unauthorized() -> Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required")
}

/// Bearer header first, then the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<SessionToken> {
    extract_bearer(headers)
        .or_else(|| extract_cookie(headers, SESSION_COOKIE))
        .map(SessionToken::from_string)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v.to_string())
}
