use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Returns the model's decoded reply for the image, with local identifiers
    /// attached. Use `ParsedTicket::from_response` to type it.
    async fn parse_ticket(&self, image_url: &str) -> AppResult<Value>;
}
