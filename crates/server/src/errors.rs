use std::io;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::storage::StoreError;
use service::RecordError;
use thiserror::Error;

/// Error answered to HTTP clients as `{"success": false, "message": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({"success": false, "message": self.message}));
        (self.status, body).into_response()
    }
}

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Invalid(r) => ApiError::bad_request(r.to_string()),
            // store details are logged by the service, not sent to clients
            RecordError::StoreUnavailable(_) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage backend unavailable")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("counter store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::Rejection;

    #[test]
    fn validation_errors_are_bad_requests() {
        for r in [Rejection::EmptyInput, Rejection::MultiWordInput, Rejection::TooShort] {
            let err = ApiError::from(RecordError::from(r));
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message, r.to_string());
        }
    }

    #[test]
    fn store_errors_hide_details() {
        let err = ApiError::from(RecordError::StoreUnavailable("redis://secret@host".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("secret"));
    }
}
