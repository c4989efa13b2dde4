use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::AppState;
use crate::products::repository::ProductRepository;
use crate::products::routes::product_router;

/// Collection path of the products resource.
pub const PRODUCTS_PATH: &str = "/api/products";

pub(crate) fn app_router() -> Router<AppState> {
    Router::new()
        .nest(PRODUCTS_PATH, product_router())
        .route("/api/health", get(health))
}

async fn health(
    State(state): State<AppState>,
    State(repository): State<ProductRepository>,
) -> impl IntoResponse {
    let products = repository.count().await;
    let uptime_ms = u64::try_from(state.uptime().as_millis()).unwrap_or(u64::MAX);

    Json(json!({
        "status": "OK",
        "products": products,
        "uptimeMs": uptime_ms,
    }))
}
