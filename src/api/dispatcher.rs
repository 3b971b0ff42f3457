//! Webhook dispatcher: the single request flow from raw request to response.
//!
//! Order of checks:
//! 1. method must be POST
//! 2. Slack redeliveries are acknowledged without processing
//! 3. signature headers must be present and the signing secret configured
//! 4. signature must verify
//! 5. body is decoded once into a [`SlackEnvelope`] and dispatched

use tracing::{error, info, warn};

use super::event_handler::handle_app_mention;
use super::helpers::HttpResponse;
use super::parsing::{WebhookRequest, decode_envelope};
use super::signature::verify_slack_signature;
use crate::ai::{AiResponder, LlmBackend};
use crate::core::models::{CallbackEvent, MentionEvent, SlackEnvelope};
use crate::errors::SlackError;
use crate::slack::ChatPlatform;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const RETRY_NUM_HEADER: &str = "x-slack-retry-num";
pub const RETRY_REASON_HEADER: &str = "x-slack-retry-reason";

const LOG_TEXT_PREVIEW_CHARS: usize = 50;

pub struct WebhookDispatcher<C, L> {
    signing_secret: Option<String>,
    slack: C,
    responder: AiResponder<L>,
}

impl<C, L> WebhookDispatcher<C, L>
where
    C: ChatPlatform,
    L: LlmBackend,
{
    #[must_use]
    pub fn new(signing_secret: Option<String>, slack: C, responder: AiResponder<L>) -> Self {
        Self {
            signing_secret,
            slack,
            responder,
        }
    }

    /// Handles one webhook call. Always produces a response; error details
    /// are logged and never echoed to the caller.
    #[tracing::instrument(level = "info", skip_all, fields(method = %request.method))]
    pub async fn dispatch(&self, request: &WebhookRequest) -> HttpResponse {
        match self.process(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Unexpected error: {}", e);
                HttpResponse::internal_error()
            }
        }
    }

    async fn process(&self, request: &WebhookRequest) -> Result<HttpResponse, SlackError> {
        if !request.method.eq_ignore_ascii_case("POST") {
            return Ok(HttpResponse::method_not_allowed());
        }

        let retry_num = request.header(RETRY_NUM_HEADER);
        let retry_reason = request.header(RETRY_REASON_HEADER);
        if retry_num.is_some() || retry_reason.is_some() {
            warn!(
                retry_num = retry_num.unwrap_or(""),
                retry_reason = retry_reason.unwrap_or(""),
                "Slack retry detected, acknowledging without processing"
            );
            return Ok(HttpResponse::ok());
        }

        let (Some(signature), Some(timestamp)) =
            (request.header(SIGNATURE_HEADER), request.header(TIMESTAMP_HEADER))
        else {
            warn!("Missing Slack signature or timestamp");
            return Ok(HttpResponse::bad_request());
        };

        let Some(signing_secret) = self.signing_secret.as_deref() else {
            error!("SLACK_SIGNING_SECRET is not configured");
            return Ok(HttpResponse::internal_error());
        };

        if !verify_slack_signature(signing_secret, &request.body, timestamp, signature) {
            warn!("Invalid Slack signature");
            return Ok(HttpResponse::unauthorized());
        }

        let envelope = match decode_envelope(&request.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!("Failed to parse request body: {}", e);
                return Ok(HttpResponse::bad_request());
            }
        };

        match envelope {
            SlackEnvelope::UrlVerification { challenge } => Ok(HttpResponse::new(200, challenge)),
            SlackEnvelope::EventCallback {
                event_id,
                event_time,
                event,
            } => {
                info!(
                    event_id = event_id.as_deref().unwrap_or(""),
                    event_type = event.type_name(),
                    event_time = event_time.unwrap_or_default(),
                    "Processing event callback"
                );

                if let CallbackEvent::AppMention(mention) = event {
                    self.on_app_mention(&mention).await?;
                }
                Ok(HttpResponse::ok())
            }
            SlackEnvelope::Unsupported => Ok(HttpResponse::ok()),
        }
    }

    async fn on_app_mention(&self, mention: &MentionEvent) -> Result<(), SlackError> {
        let preview: String = mention.text().chars().take(LOG_TEXT_PREVIEW_CHARS).collect();
        info!(
            user = mention.user.as_deref().unwrap_or(""),
            text = %preview,
            "Event details"
        );

        // Replying to bot-authored mentions would loop.
        if mention.is_from_bot() {
            info!("Ignoring bot's own message");
            return Ok(());
        }

        handle_app_mention(&self.slack, &self.responder, mention).await?;
        info!("app_mention processing completed");
        Ok(())
    }
}
