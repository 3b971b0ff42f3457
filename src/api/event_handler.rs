//! Handler for Slack `app_mention` events.
//!
//! Reads the surrounding thread (when the mention is inside one), asks the
//! model for a reply and posts it back into the same thread.

use tracing::{error, info, warn};

use crate::ai::{AiResponder, LlmBackend};
use crate::core::models::{ConversationTurn, MentionEvent};
use crate::errors::SlackError;
use crate::slack::{
    ChatPlatform, HISTORY_TURN_LIMIT, extract_clean_message, project_history, truncate_to_recent,
};

/// Maximum number of thread replies fetched for context.
pub const THREAD_FETCH_LIMIT: u16 = 50;

/// Responds to one mention.
///
/// History fetch failures degrade to answering without context; a failure to
/// post the reply is returned to the caller.
///
/// # Errors
///
/// Returns the Slack error raised while posting the reply.
pub async fn handle_app_mention<C, L>(
    slack: &C,
    responder: &AiResponder<L>,
    event: &MentionEvent,
) -> Result<(), SlackError>
where
    C: ChatPlatform + ?Sized,
    L: LlmBackend,
{
    let (Some(channel), Some(thread_ts)) = (event.channel.as_deref(), event.reply_thread_ts())
    else {
        error!("Missing required parameters: channel or thread_ts");
        return Ok(());
    };

    let clean_user_message = extract_clean_message(event.text());

    let history = match event.thread_ts.as_deref() {
        Some(root_ts) => load_thread_history(slack, channel, root_ts, event.ts.as_deref()).await,
        None => Vec::new(),
    };

    let response_text = responder.chat(&clean_user_message, &history).await;

    slack
        .post_message(channel, thread_ts, &response_text)
        .await
        .inspect_err(|e| error!("Error posting reply: {}", e))?;

    info!(channel = %channel, "Responded to app mention");
    Ok(())
}

async fn load_thread_history<C: ChatPlatform + ?Sized>(
    slack: &C,
    channel: &str,
    root_ts: &str,
    message_ts: Option<&str>,
) -> Vec<ConversationTurn> {
    match slack
        .fetch_thread_replies(channel, root_ts, THREAD_FETCH_LIMIT)
        .await
    {
        Ok(messages) => {
            let history = truncate_to_recent(project_history(&messages, message_ts), HISTORY_TURN_LIMIT);
            info!(
                fetched = messages.len(),
                parsed = history.len(),
                "Parsed thread messages for AI context"
            );
            history
        }
        Err(e) => {
            warn!("Error getting thread history: {}", e);
            Vec::new()
        }
    }
}
