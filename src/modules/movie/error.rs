use crate::common::response::ApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use uuid::Uuid;

/// Catalog failures, split so a missing movie and a broken database
/// stop sharing a status code.
#[derive(Debug, Error)]
pub enum MovieError {
    #[error("movie {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl MovieError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MovieError::NotFound(_) => StatusCode::NOT_FOUND,
            MovieError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MovieError {
    fn into_response(self) -> Response {
        ApiError(self.to_string(), self.status_code()).into_response()
    }
}
