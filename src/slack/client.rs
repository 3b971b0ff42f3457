//! Slack API client module
//!
//! Encapsulates the Slack Web API calls the responder needs: reading a
//! thread and posting a reply into it. Calls are not retried; Slack's own
//! redelivery is suppressed upstream instead.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::SlackApiChatPostMessageRequest;
use slack_morphism::{SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent, SlackTs};
use std::time::Duration;
use tracing::{info, warn};

use crate::core::models::RawMessage;
use crate::errors::SlackError;

const CONVERSATIONS_REPLIES_URL: &str = "https://slack.com/api/conversations.replies";

// Build the Slack client connector safely without panicking.
// If connector construction fails, store None and surface a SlackError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// The chat platform operations the dispatcher depends on.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Fetches up to `limit` messages of the thread rooted at `thread_ts`, oldest first.
    async fn fetch_thread_replies(
        &self,
        channel_id: &str,
        thread_ts: &str,
        limit: u16,
    ) -> Result<Vec<RawMessage>, SlackError>;

    /// Posts `text` as a reply in the given thread.
    async fn post_message(
        &self,
        channel_id: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), SlackError>;
}

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    ok: bool,
    #[serde(default)]
    messages: Vec<RawMessage>,
    error: Option<String>,
}

/// Slack Web API client authenticated with the bot token.
pub struct SlackClient {
    token: Option<SlackApiToken>,
}

impl SlackClient {
    /// A missing token is tolerated here and reported when a call is attempted.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(|t| SlackApiToken::new(SlackApiTokenValue::new(t))),
        }
    }

    fn token(&self) -> Result<&SlackApiToken, SlackError> {
        self.token
            .as_ref()
            .ok_or_else(|| SlackError::ConfigError("SLACK_BOT_TOKEN is not configured".to_string()))
    }
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn fetch_thread_replies(
        &self,
        channel_id: &str,
        thread_ts: &str,
        limit: u16,
    ) -> Result<Vec<RawMessage>, SlackError> {
        let token = self.token()?;
        let limit = limit.to_string();

        let resp = HTTP_CLIENT
            .get(CONVERSATIONS_REPLIES_URL)
            .bearer_auth(&token.token_value.0)
            .query(&[("channel", channel_id), ("ts", thread_ts), ("limit", &limit)])
            .send()
            .await
            .map_err(|e| SlackError::HttpError(format!("conversations.replies HTTP: {e}")))?;

        if !resp.status().is_success() {
            return Err(SlackError::ApiError(format!(
                "conversations.replies HTTP {}",
                resp.status()
            )));
        }

        let body: RepliesResponse = resp
            .json()
            .await
            .map_err(|e| SlackError::ParseError(format!("conversations.replies parse: {e}")))?;

        if !body.ok {
            return Err(SlackError::ApiError(format!(
                "conversations.replies error: {}",
                body.error.as_deref().unwrap_or("unknown")
            )));
        }

        info!(
            channel = %channel_id,
            count = body.messages.len(),
            "Retrieved messages from thread"
        );
        Ok(body.messages)
    }

    async fn post_message(
        &self,
        channel_id: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), SlackError> {
        let token = self.token()?;
        let session = SLACK_CLIENT
            .as_ref()
            .ok_or_else(|| SlackError::HttpError("Slack HTTP connector not initialized".to_string()))?
            .open_session(token);

        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        )
        .with_thread_ts(SlackTs(thread_ts.to_string()));

        session.chat_post_message(&post_req).await?;

        Ok(())
    }
}
