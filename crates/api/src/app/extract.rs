//! Request extractors with JSON error bodies.

use axum::{
    Json, async_trait,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use serde::de::DeserializeOwned;

use crate::app::errors;

/// `Json<T>` whose rejections use the API error body.
///
/// Bodies that parse as JSON but do not fit `T` are `validation_error`s, the
/// same as values that fail domain validation.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_response(rejection)),
        }
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    match rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            rejection.body_text(),
        ),
        other => errors::json_error(other.status(), "bad_request", other.body_text()),
    }
}
