use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::mask_secret;
use crate::domain::chat::ChatCompletionRequest;
use crate::error::AppResult;

/// One outbound chat-completion call, fully resolved.
#[derive(Clone)]
pub struct ChatRequest {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub body: ChatCompletionRequest,
}

impl fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatRequest")
            .field("endpoint", &self.endpoint)
            .field("api_key", &mask_secret(&self.api_key))
            .field("timeout", &self.timeout)
            .field("body", &self.body)
            .finish()
    }
}

/// Raw provider reply. Any HTTP status is a successful transport outcome;
/// interpreting it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fails with `AppError::Transport` only when no HTTP response was received.
    async fn send(&self, request: &ChatRequest) -> AppResult<TransportResponse>;
}
