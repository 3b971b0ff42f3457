/// Slack AI Bot - answers Slack mentions with text generated by Amazon Bedrock.
///
/// A single Lambda behind a Function URL receives Slack Events API deliveries,
/// verifies their signature, and replies in-thread to `app_mention` events,
/// using the rest of the thread as conversation context.
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda (Function URL) for serverless execution
/// - AWS Secrets Manager for the Slack bot token and signing secret
/// - Amazon Bedrock (Anthropic Messages format) for text generation
/// - slack-morphism and reqwest for Slack API interactions
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use slack_ai_bot::api::WebhookRequest;
/// use slack_ai_bot::core::config::AppConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Set up structured logging
///     slack_ai_bot::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let dispatcher = slack_ai_bot::build_dispatcher(&config).await;
///
///     let request = WebhookRequest::new(
///         "POST",
///         [("x-slack-request-timestamp", "1700000000"), ("x-slack-signature", "v0=...")],
///         r#"{"type":"url_verification","challenge":"abc123"}"#,
///     );
///     let response = dispatcher.dispatch(&request).await;
///     println!("{} {}", response.status_code, response.body);
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod slack;

pub use errors::SlackError;

use ai::{AiResponder, BedrockClient, ModelSettings};
use api::WebhookDispatcher;
use core::config::AppConfig;
use core::secrets::{SecretsManagerStore, SlackCredentials};
use slack::SlackClient;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. The level defaults to `info` and can be
/// overridden with `RUST_LOG`. Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// slack_ai_bot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Builds the production dispatcher: resolves Slack credentials and wires the
/// Slack and Bedrock clients. Runs once per cold start.
pub async fn build_dispatcher(config: &AppConfig) -> WebhookDispatcher<SlackClient, BedrockClient> {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    let store = SecretsManagerStore::new(&sdk_config);
    let credentials = SlackCredentials::resolve(config, &store).await;

    let slack = SlackClient::new(credentials.bot_token);
    let bedrock = BedrockClient::new(&sdk_config, &config.bedrock_region);
    let responder = AiResponder::new(bedrock, ModelSettings::from(config));

    WebhookDispatcher::new(credentials.signing_secret, slack, responder)
}
