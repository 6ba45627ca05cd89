//! Response envelope shared by the server and the client.
//!
//! Every reply is `{"status": "success", "data": ...}` or
//! `{"status": "error", "message": "..."}`.

use crate::errors::{Error, Result};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse<T> {
    Success { data: T },
    Error { message: String },
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Unwraps the payload, turning an error envelope into
    /// [`Error::ExternalService`].
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Error { message } => Err(Error::ExternalService { message }),
        }
    }
}

/// HTTP status an error is reported with.
#[must_use]
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::Authorization { .. } => StatusCode::FORBIDDEN,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::InvalidState { .. } => StatusCode::CONFLICT,
        Error::DataIntegrity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        Error::Config { .. } | Error::Database(_) | Error::Io(_) | Error::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
