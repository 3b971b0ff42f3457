//! Response builders shared by the dispatcher and the Lambda handler.

use serde_json::{Value, json};

/// Status code and body produced for one webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    #[must_use]
    pub fn bad_request() -> Self {
        Self::new(400, "Bad Request")
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized")
    }

    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(405, "Method Not Allowed")
    }

    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }

    /// Lambda Function URL response payload.
    #[must_use]
    pub fn into_lambda_response(self) -> Value {
        json!({
            "statusCode": self.status_code,
            "headers": { "Content-Type": "application/json" },
            "body": self.body
        })
    }
}
