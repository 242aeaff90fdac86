use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use votecast_infra::ProductRepository;
use votecast_products::{NewProduct, VoteRequest};

use crate::app::dto::{self, Data, VoteResult};
use crate::app::errors;
use crate::app::services::{AppServices, SharedStore};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product))
        .route("/:id/vote", post(vote))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let input = match NewProduct::try_from(body) {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.products.create(input, Utc::now()).await {
        Ok(product) => (StatusCode::CREATED, Json(Data::new(product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services
        .products
        .list_in_voting(ProductRepository::<SharedStore>::LIST_LIMIT)
        .await
    {
        Ok(items) => (StatusCode::OK, Json(Data::new(items))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.products.find(&id).await {
        Ok(product) => (StatusCode::OK, Json(Data::new(product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn vote(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::VoteBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let request = match VoteRequest::try_from(body) {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.votes.cast_vote(&id, request).await {
        Ok(counts) => (
            StatusCode::OK,
            Json(Data::new(VoteResult { ok: true, counts })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
