use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use votecast_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        ServiceError::InvalidState(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_state", msg),
        ServiceError::InvalidArgument(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg)
        }
        ServiceError::StoreUnavailable(e) => {
            tracing::error!(error = %e, "store request failed");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", e.to_string())
        }
    }
}

/// Malformed or wrongly typed request bodies are invalid arguments.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    service_error_to_response(ServiceError::InvalidArgument(rejection.body_text()))
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
