//! Turns a user message plus thread context into a reply that is always displayable.

use std::time::Duration;
use tracing::{error, info};

use super::client::{LlmBackend, ModelRequest};
use crate::core::config::AppConfig;
use crate::core::models::ConversationTurn;
use crate::errors::SlackError;

/// Prefix of the reply shown when the model could not produce an answer.
pub const AI_ERROR_PREFIX: &str = "申し訳ありません。AI処理中にエラーが発生しました: ";

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model_id: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl From<&AppConfig> for ModelSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            model_id: config.ai_model_id.clone(),
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.ai_max_tokens,
            temperature: config.ai_temperature,
            timeout: config.ai_timeout,
        }
    }
}

pub struct AiResponder<L> {
    backend: L,
    settings: ModelSettings,
}

impl<L: LlmBackend> AiResponder<L> {
    #[must_use]
    pub fn new(backend: L, settings: ModelSettings) -> Self {
        Self { backend, settings }
    }

    /// History turns in order, then the new user message.
    #[must_use]
    pub fn build_request(&self, message: &str, history: &[ConversationTurn]) -> ModelRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.extend_from_slice(history);
        messages.push(ConversationTurn::user(message));

        ModelRequest {
            model_id: self.settings.model_id.clone(),
            system: self.settings.system_prompt.clone(),
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// Never fails: backend errors come back as an apology carrying the error detail.
    pub async fn chat(&self, message: &str, history: &[ConversationTurn]) -> String {
        if !history.is_empty() {
            info!("Using {} messages from conversation history", history.len());
        }

        let request = self.build_request(message, history);

        match self.invoke_with_timeout(&request).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error chatting with model {}: {}", self.settings.model_id, e);
                format!("{AI_ERROR_PREFIX}{e}")
            }
        }
    }

    async fn invoke_with_timeout(&self, request: &ModelRequest) -> Result<String, SlackError> {
        let text = tokio::time::timeout(self.settings.timeout, self.backend.invoke(request))
            .await
            .map_err(|_| {
                SlackError::BedrockError(format!(
                    "model call timed out after {}s",
                    self.settings.timeout.as_secs_f32()
                ))
            })??;

        if text.trim().is_empty() {
            return Err(SlackError::BedrockError("model returned empty text".to_string()));
        }
        Ok(text)
    }
}
