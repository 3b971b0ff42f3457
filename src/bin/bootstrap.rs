// This is the Lambda bootstrap entry point for the Slack webhook function

use lambda_runtime::{Error, run, service_fn};
use slack_ai_bot::api::handler;
use slack_ai_bot::core::config::AppConfig;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    slack_ai_bot::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    // Clients and secrets are resolved once and reused across warm invocations.
    let dispatcher = slack_ai_bot::build_dispatcher(&config).await;
    let dispatcher = &dispatcher;

    run(service_fn(move |event| async move { handler(dispatcher, event).await })).await
}
