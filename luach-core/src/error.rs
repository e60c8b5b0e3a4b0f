//! Error types for the luach ecosystem.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in luach operations.
#[derive(Error, Debug)]
pub enum LuachError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LuachError {
    /// Machine-readable kind for the boundary envelope.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LuachError::Auth(_) => ErrorKind::Auth,
            LuachError::Validation(_) => ErrorKind::Validation,
            LuachError::NotFound(_) => ErrorKind::NotFound,
            LuachError::Conflict(_) => ErrorKind::Conflict,
            LuachError::Calendar(_) => ErrorKind::Calendar,
            LuachError::Sync(_) => ErrorKind::Sync,
            LuachError::Storage(_) | LuachError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// The error taxonomy surfaced at the application boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "AUTH_ERROR")]
    Auth,
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    #[serde(rename = "CONFLICT")]
    Conflict,
    #[serde(rename = "CALENDAR_ERROR")]
    Calendar,
    #[serde(rename = "SYNC_ERROR")]
    Sync,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorKind {
    /// Wire code used in failure envelopes.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Auth => "AUTH_ERROR",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Calendar => "CALENDAR_ERROR",
            ErrorKind::Sync => "SYNC_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Fixed HTTP status mapping for the boundary.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Auth => 401,
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Calendar | ErrorKind::Sync | ErrorKind::Internal => 500,
        }
    }
}

/// Result type alias for luach operations.
pub type LuachResult<T> = Result<T, LuachError>;
