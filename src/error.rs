use std::io;

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid provider API key configuration")]
    InvalidApiKey,
    #[error("provider connection failed: {status} - {body}")]
    ConnectionFailed { status: u16, body: String },
    #[error("the model returned an empty response")]
    EmptyResponse,
    #[error("the model did not return valid JSON")]
    InvalidJson(String),
    #[error("invalid ticket data: {0}")]
    InvalidTicket(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("provider transport error: {0}")]
    Transport(String),
    #[error("invalid image: {0}")]
    Image(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Stable tag used by the boundary to translate the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidApiKey => "invalid_api_key",
            AppError::ConnectionFailed { .. } => "connection_failed",
            AppError::EmptyResponse => "empty_response",
            AppError::InvalidJson(_) => "invalid_json",
            AppError::InvalidTicket(_) => "invalid_ticket",
            AppError::Configuration(_) => "configuration",
            AppError::Transport(_) => "transport",
            AppError::Image(_) => "invalid_image",
            AppError::Io(_) => "io",
        }
    }

    pub fn to_array(&self) -> Value {
        json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        })
    }
}

pub type AppResult<T> = Result<T, AppError>;
