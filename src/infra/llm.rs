use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::error::{AppError, AppResult};
use crate::infra::groq::build_payload;
use crate::prompts::PROMPT_VERSION;
use crate::services::{ChatRequest, ChatTransport, LanguageModelService};

/// Reads receipts through an OpenAI-compatible chat-completion endpoint.
///
/// Holds no per-call state, so one instance can serve concurrent callers as
/// long as the transport can.
pub struct GroqClient {
    config: ProviderConfig,
    transport: Arc<dyn ChatTransport>,
}

impl GroqClient {
    pub fn new(config: ProviderConfig, transport: Arc<dyn ChatTransport>) -> Self {
        Self { config, transport }
    }

    fn request_for(&self, image_url: &str) -> AppResult<ChatRequest> {
        let body = build_payload(image_url, &self.config)?;
        Ok(ChatRequest {
            endpoint: self.config.endpoint(),
            api_key: self.config.api_key.clone(),
            timeout: self.config.timeout,
            body,
        })
    }
}

#[async_trait]
impl LanguageModelService for GroqClient {
    async fn parse_ticket(&self, image_url: &str) -> AppResult<Value> {
        let request = self.request_for(image_url)?;
        debug!(model = %self.config.model, prompt_version = PROMPT_VERSION, "reading ticket image");
        let response = self.transport.send(&request).await?;

        if !response.is_success() {
            error!(status = response.status, body = %response.body, "provider request failed");
            return Err(AppError::ConnectionFailed {
                status: response.status,
                body: response.body,
            });
        }

        let content = extract_content(&response.body)?;
        let mut data = parse_json_content(&content)?;
        attach_local_fields(&mut data);
        Ok(Value::Object(data))
    }
}

/// Pulls `choices[0].message.content` out of the provider envelope.
fn extract_content(body: &str) -> AppResult<String> {
    let envelope: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    match envelope.pointer("/choices/0/message/content") {
        Some(Value::String(content)) => Ok(content.clone()),
        _ => {
            error!(response = %body, "provider response has no message content");
            Err(AppError::EmptyResponse)
        }
    }
}

fn parse_json_content(content: &str) -> AppResult<Map<String, Value>> {
    let parsed = serde_json::from_str::<Value>(content).or_else(|err| {
        let repaired = repair_json(content).ok_or(err)?;
        debug!("model content needed repair before parsing");
        serde_json::from_str::<Value>(repaired)
    });

    match parsed {
        Ok(Value::Object(data)) => Ok(data),
        Ok(_) | Err(_) => {
            error!(content = %content, "model content is not a JSON object");
            Err(AppError::InvalidJson(content.to_string()))
        }
    }
}

/// Best-effort slice of the JSON object inside fenced or chatty output.
fn repair_json(content: &str) -> Option<&str> {
    let trimmed = content.trim();
    let inner = match trimmed.strip_prefix("```") {
        Some(fenced) => {
            let body = fenced.split_once('\n').map_or("", |(_, rest)| rest);
            body.rfind("```").map_or(body, |end| &body[..end])
        }
        None => trimmed,
    };

    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    (end > start).then(|| &inner[start..=end])
}

/// The model is not trusted with identifiers: every product gets a fresh
/// UUIDv4 and an empty `users` list. A missing quantity means one unit.
fn attach_local_fields(data: &mut Map<String, Value>) {
    let Some(Value::Array(products)) = data.get_mut("products") else {
        return;
    };

    for product in products.iter_mut().filter_map(Value::as_object_mut) {
        product.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        product.insert("users".to_string(), Value::Array(Vec::new()));
        if product.get("quantity").is_none_or(Value::is_null) {
            product.insert("quantity".to_string(), Value::from(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::domain::ParsedTicket;
    use crate::domain::ticket::ProductData;
    use crate::services::TransportResponse;

    /// Records every request and answers with a canned response.
    struct SpyTransport {
        reply: TransportResponse,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl SpyTransport {
        fn replying(status: u16, body: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                reply: TransportResponse {
                    status,
                    body: body.into(),
                },
                requests: Mutex::new(Vec::new()),
            })
        }

        fn with_content(content: &str) -> Arc<Self> {
            Self::replying(
                200,
                json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
                    .to_string(),
            )
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatTransport for SpyTransport {
        async fn send(&self, request: &ChatRequest) -> AppResult<TransportResponse> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn config(api_key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            base_url: "https://llm.test/openai/v1".to_string(),
            model: "vision-model".to_string(),
            timeout: Duration::from_secs(7),
            temperature: 0.1,
            max_retries: 2,
            retry_delay: Duration::ZERO,
        }
    }

    fn client(api_key: &str, transport: Arc<SpyTransport>) -> GroqClient {
        GroqClient::new(config(api_key), transport)
    }

    #[tokio::test]
    async fn parses_lidl_ticket_end_to_end() {
        let transport = SpyTransport::with_content(
            r#"{"nombre":"Lidl","total":29.85,"products":[{"name":"Agua","price":0.5,"quantity":2}]}"#,
        );
        let raw = client("gsk_test", transport.clone())
            .parse_ticket("https://img.test/lidl.jpg")
            .await
            .unwrap();

        let ParsedTicket::Ticket(ticket) = ParsedTicket::from_response(raw).unwrap() else {
            panic!("expected a ticket");
        };
        assert_eq!(ticket.nombre, "Lidl");
        assert_eq!(ticket.total, 29.85);
        let [product] = ticket.products.as_slice() else {
            panic!("expected one product");
        };
        assert_eq!(product.name, "Agua");
        assert_eq!(product.price, 0.5);
        assert_eq!(product.quantity, 2);
        assert!(product.users.is_empty());
        assert!(Uuid::parse_str(&product.id).is_ok());

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].endpoint, "https://llm.test/openai/v1/chat/completions");
        assert_eq!(requests[0].api_key, "gsk_test");
        assert_eq!(requests[0].timeout, Duration::from_secs(7));
    }

    #[tokio::test]
    async fn empty_api_key_fails_before_any_call() {
        let transport = SpyTransport::with_content("{}");
        let err = client("", transport.clone())
            .parse_ticket("https://img.test/a.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidApiKey));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn failed_status_surfaces_connection_failure() {
        let transport = SpyTransport::replying(429, "rate limited");
        let err = client("key", transport)
            .parse_ticket("https://img.test/a.png")
            .await
            .unwrap_err();
        match err {
            AppError::ConnectionFailed { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_content_is_an_empty_response() {
        for body in [
            json!({"choices": []}).to_string(),
            json!({"choices": [{"message": {"role": "assistant"}}]}).to_string(),
            json!({"choices": [{"message": {"content": null}}]}).to_string(),
            "<html>gateway</html>".to_string(),
        ] {
            let err = client("key", SpyTransport::replying(200, body))
                .parse_ticket("https://img.test/a.png")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::EmptyResponse), "got {err:?}");
        }
    }

    #[tokio::test]
    async fn unparseable_content_keeps_the_raw_text() {
        let err = client("key", SpyTransport::with_content("{not json"))
            .parse_ticket("https://img.test/a.png")
            .await
            .unwrap_err();
        match err {
            AppError::InvalidJson(raw) => assert_eq!(raw, "{not json"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_object_content_is_invalid_json() {
        let err = client("key", SpyTransport::with_content("[1, 2, 3]"))
            .parse_ticket("https://img.test/a.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(raw) if raw == "[1, 2, 3]"));
    }

    #[tokio::test]
    async fn model_rejection_passes_through_as_error_data() {
        let transport = SpyTransport::with_content(
            r#"{"error":{"code":"ERR_NO_TICKET","message":"La imagen no es un ticket"}}"#,
        );
        let raw = client("key", transport)
            .parse_ticket("https://img.test/cat.png")
            .await
            .unwrap();
        let parsed = ParsedTicket::from_response(raw).unwrap();
        assert!(matches!(parsed, ParsedTicket::Error(e) if e.code == "ERR_NO_TICKET"));
    }

    #[test]
    fn repairs_fenced_and_chatty_content() {
        let fenced = "```json\n{\"nombre\": \"Dia\"}\n```";
        assert_eq!(repair_json(fenced), Some("{\"nombre\": \"Dia\"}"));

        let chatty = "Here is the ticket: {\"nombre\": \"Dia\"} Hope it helps.";
        assert_eq!(repair_json(chatty), Some("{\"nombre\": \"Dia\"}"));

        assert_eq!(repair_json("{not json"), None);
    }

    #[test]
    fn parses_repaired_content() {
        let data = parse_json_content("```json\n{\"nombre\": \"Dia\", \"total\": 3}\n```").unwrap();
        assert_eq!(data["nombre"], "Dia");
    }

    #[test]
    fn overwrites_model_identifiers_and_users() {
        let Value::Object(mut data) = json!({
            "nombre": "Eroski",
            "total": "4.00",
            "products": [
                {"id": "model-id", "name": "Pan", "price": 1, "quantity": 2, "users": ["x"]},
                {"name": "Sal", "price": "2.00"},
                "garbage",
            ],
        }) else {
            unreachable!()
        };
        attach_local_fields(&mut data);

        let products = data["products"].as_array().unwrap();
        let ids: HashSet<&str> = products[..2]
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(!ids.contains("model-id"));
        assert_eq!(products[0]["users"], json!([]));
        assert_eq!(products[1]["quantity"], 1);
        assert_eq!(products[2], "garbage");

        let sal = ProductData::from_array(products[1].clone()).unwrap();
        assert_eq!(sal.price, 2.0);
        assert_eq!(sal.quantity, 1);
    }

    #[test]
    fn payload_without_products_is_left_alone() {
        let Value::Object(mut data) = json!({"error": {"code": "E", "message": "m"}}) else {
            unreachable!()
        };
        attach_local_fields(&mut data);
        assert_eq!(Value::Object(data), json!({"error": {"code": "E", "message": "m"}}));
    }
}
