//! Request-scoped data types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Envelope of an Events API delivery, decoded once at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEnvelope {
    UrlVerification {
        #[serde(default)]
        challenge: String,
    },
    EventCallback {
        #[serde(default)]
        event_id: Option<String>,
        #[serde(default)]
        event_time: Option<i64>,
        event: CallbackEvent,
    },
    /// Any other payload type, or a payload whose shape we do not act on.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    AppMention(MentionEvent),
    #[serde(other)]
    Other,
}

impl CallbackEvent {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            CallbackEvent::AppMention(_) => "app_mention",
            CallbackEvent::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MentionEvent {
    pub channel: Option<String>,
    pub ts: Option<String>,
    pub thread_ts: Option<String>,
    pub text: Option<String>,
    pub user: Option<String>,
    pub bot_id: Option<String>,
}

impl MentionEvent {
    /// Thread the reply belongs to: the existing thread, or a new one rooted at this message.
    #[must_use]
    pub fn reply_thread_ts(&self) -> Option<&str> {
        self.thread_ts.as_deref().or(self.ts.as_deref())
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Mentions posted by a bot (non-empty `bot_id`) must not be answered.
    #[must_use]
    pub fn is_from_bot(&self) -> bool {
        self.bot_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// A message as returned by `conversations.replies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    pub text: Option<String>,
    pub ts: Option<String>,
    pub user: Option<String>,
    pub bot_id: Option<String>,
    pub app_id: Option<String>,
    pub subtype: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
