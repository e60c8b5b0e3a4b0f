//! Uniform success/failure envelopes surfaced to the rest of the
//! application (and printed by the CLI under `--json`).

use serde::Serialize;

use crate::error::{ErrorKind, LuachError, LuachResult};

/// `{success: true, data, message?}` or
/// `{success: false, error, code, details?}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success {
        success: bool,
        data: T,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Failure {
        success: bool,
        error: String,
        code: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
        #[serde(skip)]
        kind: ErrorKind,
    },
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse::Success {
            success: true,
            data,
            message: None,
        }
    }

    /// Success with an advisory message (e.g. the local-only delete warning).
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse::Success {
            success: true,
            data,
            message: Some(message.into()),
        }
    }

    pub fn failure(err: &LuachError) -> Self {
        ApiResponse::Failure {
            success: false,
            error: err.to_string(),
            code: err.kind().code(),
            details: None,
            kind: err.kind(),
        }
    }

    /// The fixed HTTP status for this envelope.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiResponse::Success { .. } => 200,
            ApiResponse::Failure { kind, .. } => kind.http_status(),
        }
    }
}

impl<T> From<LuachResult<T>> for ApiResponse<T> {
    fn from(result: LuachResult<T>) -> Self {
        match result {
            Ok(data) => ApiResponse::success(data),
            Err(err) => ApiResponse::failure(&err),
        }
    }
}
