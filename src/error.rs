//! Error taxonomy for the proxy handlers and its mapping onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::types::ErrorResponse;

/// Which upstream resource a passthrough status belongs to. Only used to pick
/// the generic message returned alongside the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Repository,
    RepositoryPage,
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    MissingParam(&'static str),

    #[error("invalid JSONP callback: {0:?}")]
    InvalidCallback(String),

    #[error("request to GitHub failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub returned malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("GitHub response has no items list")]
    UnexpectedShape,

    #[error("GitHub returned status {status} for {resource:?}")]
    UpstreamStatus { status: u16, resource: Resource },

    #[error("no repository counters found in page markup")]
    UnrecognizedMarkup,

    /// The outbound limiter was closed. `GithubClient` never closes its
    /// semaphore, so this only happens if shutdown logic is added around it.
    #[error("outbound request limiter is closed")]
    Unavailable,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParam(_) | Self::InvalidCallback(_) => StatusCode::BAD_REQUEST,
            Self::Transport(_) | Self::Parse(_) | Self::UnexpectedShape => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::UpstreamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::UnrecognizedMarkup => StatusCode::BAD_GATEWAY,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message exposed to the caller. Upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingParam(msg) => msg.to_string(),
            Self::InvalidCallback(_) => {
                "Invalid callback parameter: must be a JavaScript identifier".to_string()
            }
            Self::Transport(_) => "Failed to fetch from GitHub".to_string(),
            Self::Parse(_) => "Failed to parse GitHub response".to_string(),
            Self::UnexpectedShape => "Unexpected API error".to_string(),
            Self::UpstreamStatus {
                resource: Resource::Repository,
                ..
            } => "Failed to fetch repository data".to_string(),
            Self::UpstreamStatus {
                resource: Resource::RepositoryPage,
                ..
            } => "Failed to fetch repository page".to_string(),
            Self::UnrecognizedMarkup => "Repository page markup not recognized".to_string(),
            Self::Unavailable => "Service unavailable".to_string(),
        }
    }
}

/// HTTP-facing error: a status plus the `{"error": "..."}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
            },
        }
    }
}

impl From<&ProxyError> for ApiError {
    fn from(err: &ProxyError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            tracing::error!("{}", err);
        } else {
            tracing::warn!("{}", err);
        }
        Self::new(status, err.public_message())
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self::from(&err)
    }
}

// Errors shared between coalesced cache loaders arrive wrapped in an Arc.
impl From<Arc<ProxyError>> for ApiError {
    fn from(err: Arc<ProxyError>) -> Self {
        Self::from(err.as_ref())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
