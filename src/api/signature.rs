use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, warn};

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed distance, in seconds, between the request timestamp and now.
pub const MAX_TIMESTAMP_SKEW_SECS: u64 = 300;

const SIGNATURE_PREFIX: &str = "v0=";

/// Verifies `X-Slack-Signature` against the raw body.
///
/// Rejects unparseable or stale timestamps (more than five minutes either
/// side of now) and compares the MAC in constant time.
#[must_use]
pub fn verify_slack_signature(
    signing_secret: &str,
    request_body: &str,
    timestamp: &str,
    signature: &str,
) -> bool {
    let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        error!("System clock is before the Unix epoch");
        return false;
    };
    verify_slack_signature_at(signing_secret, request_body, timestamp, signature, now.as_secs())
}

/// Same as [`verify_slack_signature`] with an explicit current time.
#[must_use]
pub fn verify_slack_signature_at(
    signing_secret: &str,
    request_body: &str,
    timestamp: &str,
    signature: &str,
    now_secs: u64,
) -> bool {
    let Ok(ts) = timestamp.trim().parse::<u64>() else {
        warn!("Request timestamp is not a number");
        return false;
    };

    if now_secs.abs_diff(ts) > MAX_TIMESTAMP_SKEW_SECS {
        warn!("Request timestamp is too old");
        return false;
    }

    let Some(hex_sig) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    // hex::encode emits lowercase; anything else is not a signature we produced.
    if hex_sig.bytes().any(|b| b.is_ascii_uppercase()) {
        return false;
    }
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };

    let Some(mut mac) = new_mac(signing_secret) else {
        return false;
    };
    mac.update(base_string(timestamp, request_body).as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Computes the `v0=` signature Slack would send for this body and timestamp.
#[must_use]
pub fn compute_slack_signature(signing_secret: &str, timestamp: &str, request_body: &str) -> String {
    let Some(mut mac) = new_mac(signing_secret) else {
        return String::new();
    };
    mac.update(base_string(timestamp, request_body).as_bytes());
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

fn base_string(timestamp: &str, request_body: &str) -> String {
    format!("v0:{timestamp}:{request_body}")
}

fn new_mac(signing_secret: &str) -> Option<HmacSha256> {
    match HmacSha256::new_from_slice(signing_secret.as_bytes()) {
        Ok(mac) => Some(mac),
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            None
        }
    }
}
