use axum::{
    Router,
    routing::{get, post},
};

pub mod live;
pub mod products;
pub mod system;

/// Router for every endpoint; services are attached by the caller.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/diagnostics", get(system::diagnostics))
        .nest("/products", products::router())
        .route("/api/products", get(products::list_products))
        .route("/api/products/:id", get(products::get_product))
        .route("/api/products/:id/vote", post(products::vote))
        .route("/api/admin/products", post(products::create_product))
        .route("/ws/products/:id", get(live::product_updates))
}
