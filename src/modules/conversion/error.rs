use super::model::JobStatus;
use crate::common::response::ApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use uuid::Uuid;

/// Everything the conversion pipeline can report back to a caller.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("conversion job {0} not found")]
    NotFound(Uuid),

    #[error("cannot move job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("transcode failed: {0}")]
    Transcode(String),

    #[error("failed to persist rendition: {0}")]
    Persist(String),
}

impl ConversionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConversionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ConversionError::NotFound(_) => StatusCode::NOT_FOUND,
            ConversionError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ConversionError::Transcode(_) | ConversionError::Persist(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ConversionError {
    fn into_response(self) -> Response {
        ApiError(self.to_string(), self.status_code()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_variant_to_its_status_code() {
        assert_eq!(
            ConversionError::InvalidRequest("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ConversionError::NotFound(Uuid::new_v4()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ConversionError::InvalidTransition {
                from: JobStatus::Completed,
                to: JobStatus::Processing,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ConversionError::Transcode("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ConversionError::Persist("db down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = ConversionError::InvalidTransition {
            from: JobStatus::Cancelled,
            to: JobStatus::Completed,
        };
        assert_eq!(err.to_string(), "cannot move job from cancelled to completed");
    }
}
