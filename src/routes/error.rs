// Error -> HTTP response mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::Error;

#[derive(Debug)]
pub enum ApiError {
    Domain(Error),
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Domain(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Domain(e) => {
                let (status, kind) = match &e {
                    Error::NotADirectory(_) => (StatusCode::CONFLICT, "not_a_directory"),
                    Error::Exec { .. } | Error::Spawn { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "execution")
                    }
                    Error::Parse(_) | Error::OutOfRange { .. } | Error::Io { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "system")
                    }
                };
                (status, kind, e.to_string())
            }
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", m),
        };
        if status.is_server_error() {
            tracing::warn!(kind, "{}", message);
        }
        (
            status,
            Json(serde_json::json!({ "error": kind, "message": message })),
        )
            .into_response()
    }
}
