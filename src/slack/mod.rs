//! All Slack-specific functionality

pub mod client;
pub mod message_parser;

// Re-export main types for convenience
pub use client::{ChatPlatform, SlackClient};
pub use message_parser::{
    HISTORY_TURN_LIMIT, extract_clean_message, format_thread_history_for_display,
    project_history, truncate_to_recent,
};
