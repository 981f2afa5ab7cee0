use crate::namespace::NamespaceError;
use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::BucketNotFound(_) | StoreError::ObjectNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            StoreError::BucketAlreadyExists(_) => StatusCode::CONFLICT,
            StoreError::InvalidBucketName { .. } | StoreError::InvalidKey(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<NamespaceError> for AppError {
    fn from(err: NamespaceError) -> Self {
        match err {
            NamespaceError::InvalidName { .. } | NamespaceError::InvalidTransferRequest(_) => {
                AppError::bad_request(err.to_string())
            }
            NamespaceError::List { .. } => AppError::new(StatusCode::BAD_GATEWAY, err.to_string()),
            NamespaceError::Store(store_err) => store_err.into(),
        }
    }
}
