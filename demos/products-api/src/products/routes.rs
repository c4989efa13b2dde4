use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::domain::{NewProduct, PatchProduct, ProductId};
use super::repository::ProductRepository;
use crate::AppState;
use crate::errors::RepositoryError;

pub(crate) fn product_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{product_id}",
            get(get_product)
                .put(replace_product)
                .patch(patch_product)
                .delete(delete_product),
        )
}

/// Ids that do not parse can never exist.
fn parse_id(raw: &str) -> Result<ProductId, RepositoryError> {
    raw.parse().map_err(|_| RepositoryError::ProductNotFound)
}

async fn list_products(State(repo): State<ProductRepository>) -> impl IntoResponse {
    Json(repo.list().await)
}

async fn get_product(
    State(repo): State<ProductRepository>,
    Path(product_id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(&product_id)?;
    repo.get(id).await.map(Json)
}

async fn create_product(
    State(repo): State<ProductRepository>,
    Json(new_product): Json<NewProduct>,
) -> impl IntoResponse {
    let created = repo.create(new_product).await;
    (StatusCode::CREATED, Json(created))
}

async fn replace_product(
    State(repo): State<ProductRepository>,
    Path(product_id): Path<String>,
    Json(product): Json<NewProduct>,
) -> impl IntoResponse {
    let id = parse_id(&product_id)?;
    repo.replace(id, product).await.map(Json)
}

async fn patch_product(
    State(repo): State<ProductRepository>,
    Path(product_id): Path<String>,
    Json(patch): Json<PatchProduct>,
) -> impl IntoResponse {
    let id = parse_id(&product_id)?;
    repo.patch(id, patch).await.map(Json)
}

async fn delete_product(
    State(repo): State<ProductRepository>,
    Path(product_id): Path<String>,
) -> impl IntoResponse {
    let id = parse_id(&product_id)?;
    repo.delete(id).await.map(Json)
}
