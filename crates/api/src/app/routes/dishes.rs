use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use galley_core::DomainError;
use galley_infra::ServiceError;

use crate::app::{dto, errors, extract::ValidJson, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_dishes))
        .route("/:name/recipe", get(get_recipe).put(set_recipe))
        .route("/:name/serve", post(serve))
}

pub async fn list_dishes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.kitchen.list_dishes(principal.principal()).await {
        Ok(dishes) => Json(serde_json::json!({ "dishes": dishes })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// PUT /dishes/:name/recipe - replace the dish's recipe wholesale.
pub async fn set_recipe(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(name): Path<String>,
    ValidJson(body): ValidJson<dto::SetRecipeRequest>,
) -> axum::response::Response {
    let kitchen = &services.kitchen;
    let result = match (body.ingredients, body.text) {
        (Some(ingredients), None) => {
            let ingredients: BTreeMap<String, String> = ingredients
                .into_iter()
                .map(|(ingredient, quantity)| (ingredient, quantity.into_text()))
                .collect();
            kitchen.set_recipe(principal.principal(), &name, &ingredients).await
        }
        (None, Some(text)) => kitchen.set_recipe_text(principal.principal(), &name, &text).await,
        _ => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "provide exactly one of 'ingredients' or 'text'",
            );
        }
    };

    match result {
        Ok(recipe) => Json(dto::RecipeResponse::from(recipe)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_recipe(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.kitchen.recipe(principal.principal(), &name).await {
        Ok(Some(recipe)) => Json(dto::RecipeResponse::from(recipe)).into_response(),
        Ok(None) => errors::service_error_to_response(ServiceError::from(
            DomainError::recipe_not_found(name.trim()),
        )),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /dishes/:name/serve - serve exactly one portion.
pub async fn serve(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.kitchen.serve(principal.principal(), &name).await {
        Ok(receipt) => (StatusCode::CREATED, Json(dto::ServeResponse::from(receipt))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
