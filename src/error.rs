use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Pipeline failure kinds. The first four variants are the closed set of
/// user-facing rejections; the remaining ones are collaborator failures and
/// surface as generic server errors without leaking detail to the client.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("missing url query parameter")]
    MissingUrl,

    #[error("malformed url")]
    MalformedUrl,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("unsupported or undetected language")]
    UnsupportedLanguage,

    #[error("article fetch failed: {0}")]
    Fetch(String),

    #[error("rate limit store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ExtractorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingUrl | Self::MalformedUrl => StatusCode::BAD_REQUEST,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::UnsupportedLanguage => StatusCode::NOT_IMPLEMENTED,
            Self::Fetch(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExtractorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Fetch(detail) => {
                tracing::error!(%detail, "article fetch failed");
                "article fetch failed".to_string()
            }
            Self::Store(detail) | Self::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, body).into_response()
    }
}
