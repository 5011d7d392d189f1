use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use galley_core::DomainError;

use crate::app::{dto, errors, extract::ValidJson, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stock).post(add_stock))
        .route("/:name", get(get_stock))
}

/// POST /stock - set an ingredient's quantity (manual restock).
pub async fn add_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidJson(body): ValidJson<dto::AddStockRequest>,
) -> axum::response::Response {
    let quantity = body.quantity.into_text();
    match services
        .kitchen
        .add_stock(principal.principal(), &body.name, &quantity, &body.date)
        .await
    {
        Ok(movement) => (StatusCode::CREATED, Json(movement)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.kitchen.list_stock(principal.principal()).await {
        Ok(entries) => Json(serde_json::json!({ "stock": entries })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.kitchen.stock_entry(principal.principal(), &name).await {
        Ok(Some(entry)) => Json(entry).into_response(),
        Ok(None) => errors::service_error_to_response(
            DomainError::stock_entry_not_found(name.trim()).into(),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /movements - stock movement records in insertion order.
///
/// Mounted outside `/stock` so no ingredient name can shadow it.
pub async fn stock_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.kitchen.stock_history(principal.principal()).await {
        Ok(movements) => Json(serde_json::json!({ "movements": movements })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
