use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::core::models::SlackEnvelope;
use crate::errors::SlackError;

/// An inbound webhook call, independent of the hosting runtime.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    pub method: String,
    headers: HashMap<String, String>,
    pub body: String,
}

impl WebhookRequest {
    pub fn new<I, K, V>(method: impl Into<String>, headers: I, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            method: method.into(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
            body: body.into(),
        }
    }

    /// Case-insensitive header lookup; empty values count as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Builds a request from a Lambda Function URL (payload v2) or API Gateway
    /// (payload v1) event.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::ParseError` if a base64 body cannot be decoded.
    pub fn from_lambda_event(payload: &Value) -> Result<Self, SlackError> {
        let method = v_str(payload, &["requestContext", "http", "method"])
            .or_else(|| v_str(payload, &["httpMethod"]))
            .unwrap_or("")
            .to_string();

        let headers: Vec<(String, String)> = payload
            .get("headers")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let raw_body = payload.get("body").and_then(Value::as_str).unwrap_or("");
        let is_base64 = payload
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let body = if is_base64 {
            let bytes = BASE64
                .decode(raw_body)
                .map_err(|e| SlackError::ParseError(format!("Invalid base64 body: {e}")))?;
            String::from_utf8(bytes)
                .map_err(|e| SlackError::ParseError(format!("Body is not UTF-8: {e}")))?
        } else {
            raw_body.to_string()
        };

        Ok(Self::new(method, headers, body))
    }
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Decodes one `application/x-www-form-urlencoded` component (`+` is a space).
///
/// # Errors
///
/// Returns `SlackError::ParseError` if the percent-decoded bytes are not UTF-8.
pub fn decode_form_component(raw: &str) -> Result<String, SlackError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| SlackError::ParseError(format!("Failed to decode payload: {e}")))
}

/// Parses the signed body into JSON, accepting either raw JSON or a
/// `payload=<urlencoded JSON>` form body.
///
/// # Errors
///
/// Returns `SlackError::ParseError` if the body is neither.
pub fn parse_body_json(body: &str) -> Result<Value, SlackError> {
    let json_text = match body.strip_prefix("payload=") {
        Some(encoded) => decode_form_component(encoded)?,
        None => body.to_string(),
    };

    serde_json::from_str(&json_text)
        .map_err(|e| SlackError::ParseError(format!("Invalid JSON payload: {e}")))
}

/// Decodes the signed body into a [`SlackEnvelope`].
///
/// Valid JSON that does not fit any envelope we act on becomes
/// `SlackEnvelope::Unsupported` rather than an error.
///
/// # Errors
///
/// Returns `SlackError::ParseError` if the body is not JSON.
pub fn decode_envelope(body: &str) -> Result<SlackEnvelope, SlackError> {
    let json = parse_body_json(body)?;

    match serde_json::from_value::<SlackEnvelope>(json) {
        Ok(envelope) => Ok(envelope),
        Err(e) => {
            warn!("Ignoring payload with unexpected shape: {}", e);
            Ok(SlackEnvelope::Unsupported)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::CallbackEvent;
    use serde_json::json;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = WebhookRequest::new(
            "POST",
            [("X-Slack-Signature", "v0=abc"), ("x-slack-retry-num", "")],
            "{}",
        );

        assert_eq!(req.header("x-slack-signature"), Some("v0=abc"));
        assert_eq!(req.header("X-SLACK-SIGNATURE"), Some("v0=abc"));
        assert_eq!(req.header("x-slack-retry-num"), None);
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn test_from_function_url_event() {
        let event = json!({
            "version": "2.0",
            "rawPath": "/",
            "headers": {
                "x-slack-signature": "v0=abc",
                "x-slack-request-timestamp": "1700000000",
                "content-type": "application/json"
            },
            "requestContext": {"http": {"method": "POST", "path": "/"}},
            "body": "{\"type\":\"url_verification\"}",
            "isBase64Encoded": false
        });

        let req = WebhookRequest::from_lambda_event(&event).unwrap();

        assert_eq!(req.method, "POST");
        assert_eq!(req.header("X-Slack-Request-Timestamp"), Some("1700000000"));
        assert_eq!(req.body, "{\"type\":\"url_verification\"}");
    }

    #[test]
    fn test_from_event_decodes_base64_body() {
        let event = json!({
            "httpMethod": "POST",
            "headers": {},
            "body": BASE64.encode("payload=%7B%7D"),
            "isBase64Encoded": true
        });

        let req = WebhookRequest::from_lambda_event(&event).unwrap();

        assert_eq!(req.method, "POST");
        assert_eq!(req.body, "payload=%7B%7D");
    }

    #[test]
    fn test_from_event_rejects_bad_base64() {
        let event = json!({"body": "***", "isBase64Encoded": true});
        assert!(WebhookRequest::from_lambda_event(&event).is_err());
    }

    #[test]
    fn test_from_event_without_fields() {
        let req = WebhookRequest::from_lambda_event(&json!({})).unwrap();
        assert_eq!(req.method, "");
        assert_eq!(req.body, "");
    }

    #[test]
    fn test_decode_form_component() {
        assert_eq!(decode_form_component("hello%20world").unwrap(), "hello world");
        assert_eq!(decode_form_component("hello+world").unwrap(), "hello world");
        assert_eq!(
            decode_form_component("test%40example.com%26param%3Dvalue").unwrap(),
            "test@example.com&param=value"
        );
        assert_eq!(decode_form_component("1%2B1").unwrap(), "1+1");
    }

    #[test]
    fn test_parse_body_accepts_json_and_form_payload() {
        let from_json = parse_body_json(r#"{"type":"url_verification","challenge":"c"}"#).unwrap();
        let from_form = parse_body_json(
            "payload=%7B%22type%22%3A%22url_verification%22%2C%22challenge%22%3A%22c%22%7D",
        )
        .unwrap();

        assert_eq!(from_json, from_form);
    }

    #[test]
    fn test_parse_body_rejects_garbage() {
        assert!(parse_body_json("not json").is_err());
        assert!(parse_body_json("payload=%7Bbroken").is_err());
        assert!(parse_body_json("").is_err());
    }

    #[test]
    fn test_decode_envelope_falls_back_to_unsupported() {
        let envelope = decode_envelope(r#"{"type":"event_callback"}"#).unwrap();
        assert!(matches!(envelope, SlackEnvelope::Unsupported));

        let envelope = decode_envelope("[1,2,3]").unwrap();
        assert!(matches!(envelope, SlackEnvelope::Unsupported));
    }

    #[test]
    fn test_decode_envelope_app_mention() {
        let envelope = decode_envelope(
            r#"{"type":"event_callback","event":{"type":"app_mention","channel":"C1","ts":"1.0","text":"<@U1> hi"}}"#,
        )
        .unwrap();

        let SlackEnvelope::EventCallback {
            event: CallbackEvent::AppMention(mention),
            ..
        } = envelope
        else {
            panic!("expected app_mention");
        };
        assert_eq!(mention.text(), "<@U1> hi");
    }
}
