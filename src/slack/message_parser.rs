//! Mention stripping and thread history projection.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::core::models::{ConversationTurn, RawMessage};

/// Number of most recent turns handed to the model as context.
pub const HISTORY_TURN_LIMIT: usize = 20;

const DISPLAY_LINE_LIMIT: usize = 10;

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<@[UW][A-Z0-9]+>").expect("static regex compile"));

/// Removes every `<@U…>` / `<@W…>` mention token and trims the result.
#[must_use]
pub fn extract_clean_message(text: &str) -> String {
    let mut current = text.to_string();
    // Removing one token can splice a new one together (`<@<@U1>U2>`).
    while MENTION_RE.is_match(&current) {
        current = MENTION_RE.replace_all(&current, "").into_owned();
    }
    current.trim().to_string()
}

impl RawMessage {
    #[must_use]
    pub fn is_bot_authored(&self) -> bool {
        self.bot_id.is_some()
            || self.app_id.is_some()
            || self.subtype.as_deref() == Some("bot_message")
    }
}

/// Converts thread replies into conversation turns, oldest first.
///
/// Messages with no text left after mention stripping are dropped, as is the
/// message whose `ts` equals `exclude_ts` (the mention that triggered this call).
#[must_use]
pub fn project_history(messages: &[RawMessage], exclude_ts: Option<&str>) -> Vec<ConversationTurn> {
    messages
        .iter()
        .filter(|msg| exclude_ts.is_none() || msg.ts.as_deref() != exclude_ts)
        .filter_map(|msg| {
            let text = msg.text.as_deref().unwrap_or("");
            if text.is_empty() {
                return None;
            }

            let clean_text = extract_clean_message(text);
            if clean_text.is_empty() {
                return None;
            }

            let turn = if msg.is_bot_authored() {
                ConversationTurn::assistant(clean_text)
            } else {
                ConversationTurn::user(clean_text)
            };
            debug!(role = ?turn.role, "Added history turn");
            Some(turn)
        })
        .collect()
}

/// Keeps only the `limit` most recent turns.
#[must_use]
pub fn truncate_to_recent(mut turns: Vec<ConversationTurn>, limit: usize) -> Vec<ConversationTurn> {
    if turns.len() > limit {
        turns.drain(..turns.len() - limit);
    }
    turns
}

/// Renders a thread as numbered lines for humans. Diagnostic helper; the reply
/// path feeds the model [`project_history`] instead.
#[must_use]
pub fn format_thread_history_for_display(messages: &[RawMessage]) -> String {
    if messages.len() <= 1 {
        return "スレッド内の会話履歴はありません。".to_string();
    }

    let mut lines = vec!["📝 スレッド内の会話履歴:".to_string()];

    for (i, msg) in messages.iter().enumerate() {
        let clean_text = extract_clean_message(msg.text.as_deref().unwrap_or(""));
        if clean_text.is_empty() {
            continue;
        }

        let n = i + 1;
        if msg.bot_id.is_some() || msg.app_id.is_some() {
            let name = msg.username.as_deref().unwrap_or("Bot");
            lines.push(format!("{n}. {name}: {clean_text}"));
        } else {
            let user = msg.user.as_deref().unwrap_or("unknown");
            lines.push(format!("{n}. <@{user}>: {clean_text}"));
        }
    }

    if lines.len() == 1 {
        return "スレッド内にメッセージはありません。".to_string();
    }

    if lines.len() > DISPLAY_LINE_LIMIT + 1 {
        lines.truncate(DISPLAY_LINE_LIMIT + 1);
        lines.push("... (以下省略)".to_string());
    }

    lines.join("\n")
}
