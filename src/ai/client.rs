//! LLM (Amazon Bedrock) API client module
//!
//! Speaks the Anthropic Messages format through Bedrock's `InvokeModel`.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockRuntimeClient;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::core::models::ConversationTurn;
use crate::errors::SlackError;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Everything needed for one model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model_id: String,
    pub system: String,
    pub messages: Vec<ConversationTurn>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Runs the model and returns the first text segment of its answer.
    async fn invoke(&self, request: &ModelRequest) -> Result<String, SlackError>;
}

/// Bedrock runtime client, built once per process.
pub struct BedrockClient {
    client: BedrockRuntimeClient,
}

impl BedrockClient {
    /// Builds a client pinned to `region`, reusing credentials from `sdk_config`.
    #[must_use]
    pub fn new(sdk_config: &aws_config::SdkConfig, region: &str) -> Self {
        let config = aws_sdk_bedrockruntime::config::Builder::from(sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: BedrockRuntimeClient::from_conf(config),
        }
    }
}

#[must_use]
pub fn build_request_body(request: &ModelRequest) -> Value {
    json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "system": request.system,
        "messages": request.messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

/// Pulls `content[0].text` out of an Anthropic Messages response.
///
/// # Errors
///
/// Returns `SlackError::BedrockError` when the content list is missing or
/// empty, or when its first entry carries no non-empty text.
pub fn extract_text(response: &Value) -> Result<String, SlackError> {
    let Some(first) = response
        .get("content")
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
    else {
        error!("Unexpected response format: {}", response);
        return Err(SlackError::BedrockError(
            "Unexpected response format: missing content".to_string(),
        ));
    };

    match first.get("text").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(SlackError::BedrockError(
            "Unexpected response format: no text in first content block".to_string(),
        )),
    }
}

#[async_trait]
impl LlmBackend for BedrockClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<String, SlackError> {
        let body = build_request_body(request);

        #[cfg(feature = "debug-logs")]
        info!("Using Bedrock request body:\n{}", body);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            model_id = %request.model_id,
            message_count = request.messages.len(),
            "Invoking Bedrock model"
        );

        let output = self
            .client
            .invoke_model()
            .model_id(&request.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(serde_json::to_vec(&body)?))
            .send()
            .await
            .map_err(|e| {
                SlackError::BedrockError(format!("InvokeModel failed: {}", DisplayErrorContext(&e)))
            })?;

        let response: Value = serde_json::from_slice(output.body().as_ref()).map_err(|e| {
            SlackError::BedrockError(format!("Failed to parse Bedrock response: {e}"))
        })?;

        extract_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ModelRequest {
        ModelRequest {
            model_id: "model-x".to_string(),
            system: "Be kind.".to_string(),
            messages: vec![
                ConversationTurn::user("hi"),
                ConversationTurn::assistant("hello"),
                ConversationTurn::user("how are you?"),
            ],
            max_tokens: 1000,
            temperature: 0.5,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = build_request_body(&sample_request());

        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(body["system"], "Be kind.");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(
            body["messages"],
            json!([
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": "how are you?"}
            ])
        );
        assert!(body.get("model_id").is_none());
    }

    #[test]
    fn test_extract_text_takes_first_block() {
        let response = json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ],
            "stop_reason": "end_turn"
        });

        assert_eq!(extract_text(&response).unwrap(), "first");
    }

    #[test]
    fn test_extract_text_rejects_missing_or_empty_content() {
        for response in [
            json!({}),
            json!({"content": []}),
            json!({"content": [{"type": "tool_use", "id": "t1"}]}),
            json!({"content": [{"type": "text", "text": "   "}]}),
        ] {
            let err = extract_text(&response).unwrap_err();
            assert!(matches!(err, SlackError::BedrockError(_)), "{response}");
        }
    }
}
