use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::SlackError;

pub const DEFAULT_AWS_REGION: &str = "ap-northeast-1";
pub const DEFAULT_MODEL_ID: &str = "apac.anthropic.claude-sonnet-4-20250514-v1:0";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SYSTEM_PROMPT: &str = "あなたは親しみやすいSlack Botアシスタントです。\n\
日本語で自然に会話し、ユーザーを支援してください。\n\
簡潔で分かりやすい回答を心がけてください。";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_bot_token: Option<String>,
    pub slack_bot_token_secret_arn: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub slack_signing_secret_secret_arn: Option<String>,
    pub aws_region: String,
    pub bedrock_region: String,
    pub ai_model_id: String,
    pub ai_max_tokens: u32,
    pub ai_temperature: f64,
    pub ai_timeout: Duration,
    pub system_prompt: String,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::ConfigError` if a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self, SlackError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::ConfigError` if a numeric setting cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SlackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            slack_bot_token: get("SLACK_BOT_TOKEN"),
            slack_bot_token_secret_arn: get("SLACK_BOT_TOKEN_SECRET_ARN"),
            slack_signing_secret: get("SLACK_SIGNING_SECRET"),
            slack_signing_secret_secret_arn: get("SLACK_SIGNING_SECRET_SECRET_ARN"),
            aws_region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            bedrock_region: get("BEDROCK_REGION")
                .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            ai_model_id: get("AI_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            ai_max_tokens: parse_or("AI_MAX_TOKENS", get("AI_MAX_TOKENS"), DEFAULT_MAX_TOKENS)?,
            ai_temperature: parse_or(
                "AI_TEMPERATURE",
                get("AI_TEMPERATURE"),
                DEFAULT_TEMPERATURE,
            )?,
            ai_timeout: Duration::from_secs(parse_or(
                "AI_TIMEOUT_SECS",
                get("AI_TIMEOUT_SECS"),
                DEFAULT_AI_TIMEOUT_SECS,
            )?),
            system_prompt: get("AI_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, SlackError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| SlackError::ConfigError(format!("{key}: {e}"))),
        None => Ok(default),
    }
}
