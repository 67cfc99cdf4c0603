use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

const RAW_SNIPPET_MAX: usize = 800;

/// Failure of the outbound call to the text-generation endpoint.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("inference request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("inference endpoint returned HTTP {0}")]
    Status(u16),
    #[error("inference endpoint reported an error: {0}")]
    Provider(String),
    #[error("inference endpoint returned no generated text")]
    EmptyGeneration,
}

/// Provider text that does not parse into the expected output contract.
/// Carries the raw candidate so it can be logged, never echoed to clients.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct MalformedResponseError {
    pub reason: String,
    pub raw: String,
}

impl MalformedResponseError {
    pub fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { field: String, message: String },
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponseError),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
    #[error("Internal Server Error: {0}")]
    Internal(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, field) = match &self {
            ApiError::Validation { field, .. } => (StatusCode::BAD_REQUEST, Some(field.clone())),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, None),
            ApiError::Adapter(_)
            | ApiError::MalformedResponse(_)
            | ApiError::Internal(_)
            | ApiError::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        // Provider internals stay in the logs; clients only see a safe message.
        let message = match &self {
            ApiError::Adapter(err) => {
                warn!("inference call failed: {err}");
                "Failed to reach the AI provider".to_string()
            }
            ApiError::MalformedResponse(err) => {
                let snippet: String = err.raw.chars().take(RAW_SNIPPET_MAX).collect();
                warn!("malformed model output ({}): {}", err.reason, snippet);
                "The AI provider returned an unusable response".to_string()
            }
            ApiError::Other(err) => {
                warn!("internal error: {err:#}");
                "Internal server error".to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Validation { message, .. } => message.clone(),
        };

        (status, Json(ErrorBody { message, field })).into_response()
    }
}
