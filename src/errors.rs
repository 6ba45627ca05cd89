//! Unified error type for the workflow core, persistence layer and API surface.

use thiserror::Error;

/// All failures surfaced by `budget-flow`.
///
/// The first five variants are the workflow taxonomy callers are expected to
/// distinguish; the rest wrap infrastructure failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any state was touched (empty submission, missing reason).
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of the rejected input
        message: String,
    },

    /// The acting user is not allowed to perform the action on this record.
    #[error("Not authorized: {message}")]
    Authorization {
        /// Why the actor was refused
        message: String,
    },

    /// The record's current status forbids the requested action.
    #[error("Invalid state: cannot {action} while {current}")]
    InvalidState {
        /// The attempted action
        action: String,
        /// The status that blocked it
        current: String,
    },

    /// A remote collaborator failed or answered with something unusable.
    #[error("External service error: {message}")]
    ExternalService {
        /// Transport or decoding failure detail
        message: String,
    },

    /// Master data references that cannot be resolved.
    #[error("Data integrity error: {message}")]
    DataIntegrity {
        /// The broken reference
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. "Budget request"
        entity: &'static str,
        /// The identifier that was looked up
        id: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::ExternalService {
            message: value.to_string(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
