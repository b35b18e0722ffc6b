use crate::domain::error::DomainError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::Domain(err) => match &err {
                DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string()),
                DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
                }
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                DomainError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                DomainError::Upstream(_) => {
                    warn!(error = %err, "upstream service failed");
                    (StatusCode::BAD_GATEWAY, "upstream service failed".to_string())
                }
                DomainError::Aggregation { .. }
                | DomainError::RollbackFailed { .. }
                | DomainError::Unexpected(_) => {
                    error!(error = %err, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal error".to_string(),
                    )
                }
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::Internal(err) => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::AppError;
    use crate::domain::error::DomainError;

    fn status_of(err: DomainError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_distinct_statuses() {
        assert_eq!(status_of(DomainError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DomainError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(DomainError::NotFound("post".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::AlreadyExists("like".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::Upstream("google".to_string())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn aggregation_and_rollback_failures_are_internal() {
        let aggregation =
            DomainError::aggregation("authors")(DomainError::Unexpected("down".to_string()));
        assert_eq!(status_of(aggregation), StatusCode::INTERNAL_SERVER_ERROR);

        let rollback = DomainError::RollbackFailed {
            source: Box::new(DomainError::NotFound("category".to_string())),
            rollback: Box::new(DomainError::Unexpected("reset".to_string())),
        };
        assert_eq!(status_of(rollback), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
