//! Lambda Function URL handler - thin adapter around the dispatcher.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use super::dispatcher::WebhookDispatcher;
use super::helpers::HttpResponse;
use super::parsing::WebhookRequest;
use crate::ai::LlmBackend;
use crate::slack::ChatPlatform;

/// Lambda handler for the webhook endpoint.
///
/// # Errors
///
/// Never returns `Err`; every outcome is mapped to an HTTP response payload.
#[tracing::instrument(level = "info", skip_all, fields(request_id = %event.context.request_id))]
pub async fn function_handler<C, L>(
    dispatcher: &WebhookDispatcher<C, L>,
    event: LambdaEvent<Value>,
) -> Result<Value, Error>
where
    C: ChatPlatform,
    L: LlmBackend,
{
    info!("=== Lambda invoked ===");

    let response = match WebhookRequest::from_lambda_event(&event.payload) {
        Ok(request) => dispatcher.dispatch(&request).await,
        Err(e) => {
            error!("Failed to read request: {}", e);
            HttpResponse::bad_request()
        }
    };

    info!(status = response.status_code, "Request completed");
    Ok(response.into_lambda_response())
}
