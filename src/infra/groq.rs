use crate::config::ProviderConfig;
use crate::domain::chat::{
    ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl, ResponseFormat,
};
use crate::error::{AppError, AppResult};
use crate::prompts::{SYSTEM_PROMPT, USER_INSTRUCTION};

/// Builds the chat-completion body for one image. Performs no I/O.
pub fn build_payload(image_url: &str, config: &ProviderConfig) -> AppResult<ChatCompletionRequest> {
    if config.api_key.trim().is_empty() {
        return Err(AppError::InvalidApiKey);
    }

    Ok(ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::System {
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage::User {
                content: vec![
                    ContentPart::Text {
                        text: USER_INSTRUCTION.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_url.to_string(),
                        },
                    },
                ],
            },
        ],
        temperature: config.temperature,
        stream: false,
        response_format: ResponseFormat::json_object(),
    })
}
