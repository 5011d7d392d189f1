use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use galley_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    json_errors(status, err.code(), err.messages())
}

pub fn status_for(err: &ServiceError) -> StatusCode {
    match err.code() {
        "validation_error" => StatusCode::BAD_REQUEST,
        "recipe_not_found" | "not_found" => StatusCode::NOT_FOUND,
        "insufficient_stock" => StatusCode::CONFLICT,
        "permission_denied" => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    json_errors(status, code, vec![message.into()])
}

pub fn json_errors(
    status: StatusCode,
    code: &'static str,
    messages: Vec<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "messages": messages,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use galley_core::DomainError;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::recipe_not_found("Soup"), StatusCode::NOT_FOUND),
            (DomainError::stock_entry_not_found("egg"), StatusCode::NOT_FOUND),
            (DomainError::insufficient_stock(vec!["x".into()]), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&ServiceError::from(err)), status);
        }
    }

    #[test]
    fn internal_errors_are_server_errors() {
        let err = ServiceError::Internal("boom".into());
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
