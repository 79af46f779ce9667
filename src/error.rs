use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;
use crate::chat::Rejected;

/// Shown when no Gemini API key has been configured.
pub const NOT_CONFIGURED_MESSAGE: &str = "请先配置 Gemini API Key 才能使用 AI 功能。";
/// Shown when the model answered but without any usable text.
pub const CANNOT_ANSWER_MESSAGE: &str = "抱歉，我现在无法回答。";
/// Shown for transport, status and decoding failures.
pub const FALLBACK_MESSAGE: &str = "连接 AI 服务时出现了一点小插曲，请稍后再试。";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        response::error::<()>(status, message).into_response()
    }
}

/// Why a text generation call produced no text.
///
/// The dispatcher never turns these into HTTP errors; callers collapse them
/// into displayable text with [`GenerationError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("no Gemini API key configured")]
    NotConfigured,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("endpoint answered with status {0}")]
    Status(u16),

    #[error("could not decode response body: {0}")]
    Decode(String),

    #[error("response carried no candidate text")]
    EmptyCandidate,
}

impl GenerationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::NotConfigured => NOT_CONFIGURED_MESSAGE,
            GenerationError::EmptyCandidate => CANNOT_ANSWER_MESSAGE,
            GenerationError::Transport(_)
            | GenerationError::Status(_)
            | GenerationError::Decode(_) => FALLBACK_MESSAGE,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter.
        let err = err.without_url();
        if err.is_decode() {
            GenerationError::Decode(err.to_string())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

impl From<Rejected> for AppError {
    fn from(rejected: Rejected) -> Self {
        match rejected {
            Rejected::EmptyInput => AppError::BadRequest(rejected.to_string()),
            Rejected::AwaitingResponse => AppError::Conflict(rejected.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Background task failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
