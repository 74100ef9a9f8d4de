use axum::{response::IntoResponse, Json};

/// Failure to recover a plaintext from a secure reference.
///
/// Every decoding failure collapses into one variant so callers cannot
/// distinguish a truncated token from a forged one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference is tampered or invalid")]
    TamperedOrInvalid,
    #[error("reference could not be sealed")]
    Seal,
}

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Backend failure: {0}")]
    BackendFailure(String),
}

impl BotError {
    /// Maps a reqwest failure, separating deadline expiry from other transport errors.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;

impl IntoResponse for BotError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::Reference(_) => (StatusCode::BAD_REQUEST, "invalid key".to_string()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Timeout => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            Self::Transport(_) | Self::Status(_) | Self::Decode(_) | Self::BackendFailure(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
