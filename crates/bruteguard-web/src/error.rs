use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bruteguard_core::CoreError;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::AlreadyExists(_) => AppError::Conflict(e.to_string()),
            CoreError::NotFound(_) => AppError::NotFound(e.to_string()),
            CoreError::InvalidAddress(_) => AppError::BadRequest(e.to_string()),
            // A stored entry that no longer parses is our problem, not the caller's.
            CoreError::InvalidSubnet(_)
            | CoreError::InvalidConfig(_)
            | CoreError::ConfigParse(_)
            | CoreError::Backend(_)
            | CoreError::Io(_) => AppError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: CoreError) -> StatusCode {
        AppError::from(e).into_response().status()
    }

    #[test]
    fn core_errors_map_to_statuses() {
        assert_eq!(status_of(CoreError::AlreadyExists("a".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(CoreError::NotFound("a".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(CoreError::InvalidAddress("a".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CoreError::InvalidSubnet("a".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CoreError::Backend("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
