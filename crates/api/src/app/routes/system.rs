use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::app::errors;
use crate::app::services::AppServices;

/// Collection names shown by `/diagnostics`.
const DIAGNOSTIC_COLLECTIONS: usize = 10;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Backend running",
        "now": Utc::now(),
    }))
}

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "store": "connected"})),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            errors::json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", e.to_string())
        }
    }
}

pub async fn diagnostics(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let (connected, collections) = match services.store.collections().await {
        Ok(mut names) => {
            names.truncate(DIAGNOSTIC_COLLECTIONS);
            (true, names)
        }
        Err(e) => {
            tracing::warn!(error = %e, "diagnostics could not list collections");
            (false, Vec::new())
        }
    };

    let body = json!({
        "store": services.store.kind(),
        "connected": connected,
        "collections": collections,
        "subscriptions": {
            "topics": services.registry.topic_count(),
            "channels": services.registry.total_channels(),
        },
    });
    (StatusCode::OK, Json(body)).into_response()
}
