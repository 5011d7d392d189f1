use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/low-stock", get(low_stock))
        .route("/servings", get(serving_counts))
        .route("/servings/history", get(serving_history))
}

/// GET /reports/low-stock?threshold=N
pub async fn low_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::LowStockQuery>,
) -> axum::response::Response {
    let threshold = query.threshold.unwrap_or(services.kitchen.low_stock_threshold());
    match services
        .kitchen
        .low_stock(principal.principal(), query.threshold)
        .await
    {
        Ok(alerts) => Json(dto::LowStockResponse {
            threshold,
            alerts: alerts.into_iter().map(dto::LowStockAlertDto::from).collect(),
        })
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /reports/servings - portions served per dish.
pub async fn serving_counts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.kitchen.serving_counts(principal.principal()).await {
        Ok(counts) => Json(serde_json::json!({ "servings": counts })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn serving_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.kitchen.serving_history(principal.principal()).await {
        Ok(events) => Json(serde_json::json!({ "servings": events })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
