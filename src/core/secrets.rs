//! Slack credential resolution.
//!
//! A value supplied directly in the environment wins; otherwise the configured
//! Secrets Manager ARN is looked up. Lookup failures are logged and leave the
//! credential unavailable instead of aborting startup.

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use tracing::{error, info};

use super::config::AppConfig;
use crate::errors::SlackError;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches the secret string stored under `secret_id`.
    async fn get_secret(&self, secret_id: &str) -> Result<String, SlackError>;
}

/// AWS Secrets Manager backed secret store.
pub struct SecretsManagerStore {
    client: SecretsManagerClient,
}

impl SecretsManagerStore {
    #[must_use]
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: SecretsManagerClient::new(sdk_config),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret(&self, secret_id: &str) -> Result<String, SlackError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| SlackError::AwsError(format!("{}", DisplayErrorContext(&e))))?;

        output
            .secret_string()
            .map(ToString::to_string)
            .ok_or_else(|| SlackError::AwsError(format!("Secret {secret_id} has no string value")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlackCredentials {
    pub bot_token: Option<String>,
    pub signing_secret: Option<String>,
}

impl SlackCredentials {
    pub async fn resolve<S: SecretStore + ?Sized>(config: &AppConfig, store: &S) -> Self {
        let bot_token = resolve_one(
            "SLACK_BOT_TOKEN",
            config.slack_bot_token.as_deref(),
            config.slack_bot_token_secret_arn.as_deref(),
            store,
        )
        .await;
        let signing_secret = resolve_one(
            "SLACK_SIGNING_SECRET",
            config.slack_signing_secret.as_deref(),
            config.slack_signing_secret_secret_arn.as_deref(),
            store,
        )
        .await;

        info!(
            bot_token_available = bot_token.is_some(),
            signing_secret_available = signing_secret.is_some(),
            "Resolved Slack credentials"
        );

        Self {
            bot_token,
            signing_secret,
        }
    }
}

async fn resolve_one<S: SecretStore + ?Sized>(
    name: &str,
    direct: Option<&str>,
    secret_arn: Option<&str>,
    store: &S,
) -> Option<String> {
    if let Some(value) = direct {
        return Some(value.to_string());
    }

    let arn = secret_arn?;
    match store.get_secret(arn).await {
        Ok(value) => {
            info!(secret = %name, secret_arn = %arn, "Retrieved secret");
            Some(value)
        }
        Err(e) => {
            error!(secret = %name, secret_arn = %arn, "Failed to get secret: {}", e);
            None
        }
    }
}
