use serde::{Deserialize, Serialize};

/// Standard error envelope: `{"success": false, "error": "..."}`.
///
/// `retryAfter` is only present on rate-limited responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(
        rename = "retryAfter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_after: Option<u64>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: false,
            error: message.to_string(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after = Some(secs);
        self
    }
}

/// Standard success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Bare `{"success": true}` used by operations with nothing to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
}

impl Acknowledgement {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
