use crate::infrastructure::media::{ProbeError, ToolError};
use crate::infrastructure::storage::StoreError;
use axum::http::StatusCode;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported resolution: {0}")]
    UnknownResolution(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("no valid resolutions")]
    PlanningEmpty,

    #[error("failed to spool upload: {0}")]
    Spool(#[source] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnknownResolution(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Spool(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Probe(_) | AppError::Tool(_) => StatusCode::BAD_GATEWAY,
            AppError::PlanningEmpty => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        let err = AppError::Validation("Empty file data".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Empty file data");

        let err = AppError::UnknownResolution("4k".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Unsupported resolution: 4k");
    }

    #[test]
    fn store_not_found_maps_to_404() {
        let err: AppError = StoreError::NotFound("videos/a.mp4".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
