use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE},
};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::{ChatRequest, ChatTransport, TransportResponse};

/// Single-attempt transport over reqwest. Wrap it in
/// [`super::retry::RetryingTransport`] for the retry policy.
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatTransport for ReqwestTransport {
    async fn send(&self, request: &ChatRequest) -> AppResult<TransportResponse> {
        debug!(endpoint = %request.endpoint, model = %request.body.model, "calling provider");

        let response = self
            .http
            .post(&request.endpoint)
            .bearer_auth(&request.api_key)
            .timeout(request.timeout)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request.body)
            .send()
            .await
            .map_err(|err| AppError::Transport(format!("failed to call provider: {err}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::Transport(format!("failed to read provider response: {err}")))?;

        debug!(status, bytes = body.len(), "provider responded");
        Ok(TransportResponse { status, body })
    }
}
