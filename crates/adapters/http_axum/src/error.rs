//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use patchwork_domain::error::{ExecutionError, NotFoundError, PatchworkError, UserHint, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<UserHint>,
}

/// Maps application errors to an HTTP response with an appropriate status code.
pub enum ApiError {
    Domain(PatchworkError),
    Execution(ExecutionError),
}

impl From<PatchworkError> for ApiError {
    fn from(err: PatchworkError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        Self::Execution(err)
    }
}

fn execution_status(err: &ExecutionError) -> StatusCode {
    match err {
        ExecutionError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ExecutionError::PermissionDenied => StatusCode::FORBIDDEN,
        ExecutionError::Failed { .. } => StatusCode::BAD_GATEWAY,
        ExecutionError::Programmer(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, hint) = match &self {
            Self::Domain(PatchworkError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string(), None)
            }
            Self::Domain(PatchworkError::NotFound(err)) => {
                (StatusCode::NOT_FOUND, err.to_string(), None)
            }
            Self::Domain(PatchworkError::Execution(err)) => (
                execution_status(&err.source),
                format!("{err}: {}", err.source),
                Some(err.source.user_hint()),
            ),
            Self::Domain(PatchworkError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    None,
                )
            }
            Self::Execution(err) => {
                if err.is_programmer_error() {
                    tracing::error!(error = %err, "programmer error");
                }
                (execution_status(err), err.to_string(), Some(err.user_hint()))
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                hint,
            }),
        )
            .into_response()
    }
}
