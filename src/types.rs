// Error kinds shared by every stage of the upload pipeline

use axum::http::StatusCode;
use serde_json::{json, Value};

pub const MSG_METHOD_NOT_ALLOWED: &str = "Method not allowed.";
pub const MSG_MISSING_CONTENT_TYPE: &str = "Content-Type header not found.";
pub const MSG_MISSING_FIELDS: &str = "API Key, User ID, or file is missing.";
pub const MSG_UPLOAD_REJECTED: &str = "Failed to start upload to Roblox.";
pub const MSG_POLL_INCOMPLETE: &str = "Failed to complete upload (timeout or polling error).";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", MSG_METHOD_NOT_ALLOWED)]
    MethodNotAllowed,

    /// Missing header, missing fields or an undecodable body
    #[error("{0}")]
    BadRequest(String),

    /// A part could not be split or named; surfaced as a server fault
    #[error("Malformed multipart body: {0}")]
    MalformedMultipart(String),

    /// The asset endpoint refused the upload or returned no operation id
    #[error("{}", MSG_UPLOAD_REJECTED)]
    UpstreamRejected { status: StatusCode, body: Value },

    /// The operation never finished, or finished without an asset id
    #[error("{}", MSG_POLL_INCOMPLETE)]
    PollTimeout { last_payload: Option<Value> },

    #[error("{0}")]
    UnexpectedFailure(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamRejected { status, .. } => *status,
            AppError::MalformedMultipart(_)
            | AppError::PollTimeout { .. }
            | AppError::UnexpectedFailure(_)
            | AppError::Http(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent back to the caller for this failure
    pub fn body(&self) -> Value {
        let mut body = json!({
            "status": "error",
            "message": self.to_string(),
        });

        match self {
            AppError::UpstreamRejected { body: upstream, .. } => {
                body["robloxResponse"] = upstream.clone();
            }
            AppError::PollTimeout { last_payload } => {
                body["robloxPollingResponse"] = last_payload.clone().unwrap_or(Value::Null);
            }
            _ => {}
        }

        body
    }

    pub fn log(&self) {
        match self {
            AppError::MethodNotAllowed | AppError::BadRequest(_) => {
                tracing::debug!(error = %self, "Rejected upload request");
            }
            AppError::UpstreamRejected { status, .. } => {
                tracing::warn!(status = %status, "Asset API rejected the upload");
            }
            AppError::PollTimeout { last_payload } => {
                tracing::warn!(
                    has_payload = last_payload.is_some(),
                    "Upload operation did not complete"
                );
            }
            AppError::MalformedMultipart(_)
            | AppError::UnexpectedFailure(_)
            | AppError::Http(_)
            | AppError::Serialization(_) => {
                tracing::error!(error = %self, "Unexpected upload failure");
            }
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
