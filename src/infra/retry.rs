use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::ProviderConfig;
use crate::error::{AppError, AppResult};
use crate::services::{ChatRequest, ChatTransport, TransportResponse};

/// Fixed-count, fixed-delay retry. `max_retries` counts attempts after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: config.retry_delay,
        }
    }
}

pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T: ChatTransport> ChatTransport for RetryingTransport<T> {
    async fn send(&self, request: &ChatRequest) -> AppResult<TransportResponse> {
        let mut retries = 0;
        loop {
            let outcome = self.inner.send(request).await;
            if !is_retryable(&outcome) || retries >= self.policy.max_retries {
                return outcome;
            }
            retries += 1;
            match &outcome {
                Ok(response) => warn!(
                    status = response.status,
                    retry = retries,
                    max_retries = self.policy.max_retries,
                    "provider returned a server error, retrying"
                ),
                Err(err) => warn!(
                    error = %err,
                    retry = retries,
                    max_retries = self.policy.max_retries,
                    "provider unreachable, retrying"
                ),
            }
            tokio::time::sleep(self.policy.delay).await;
        }
    }
}

fn is_retryable(outcome: &AppResult<TransportResponse>) -> bool {
    match outcome {
        Ok(response) => response.is_server_error(),
        Err(AppError::Transport(_)) => true,
        Err(_) => false,
    }
}
