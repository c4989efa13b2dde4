use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Error, derive_more::From, derive_more::Display)]
pub(crate) enum RepositoryError {
    DbError(serde_json::Error),

    #[display("Not found")]
    ProductNotFound,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
}

impl IntoResponse for RepositoryError {
    fn into_response(self) -> axum::response::Response {
        match self {
            // answered like the hosted mock: a bare JSON string
            Self::ProductNotFound => (StatusCode::NOT_FOUND, Json("Not found")).into_response(),
            Self::DbError(_) => {
                let message = self.to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}
