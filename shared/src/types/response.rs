//! API response types and wrappers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unified error response structure for API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a single detail to the error response
    pub fn with_detail(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        let mut details = self.details.unwrap_or_default();
        details.insert(key.to_string(), value);
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::new("INVALID_CREDENTIALS", "Invalid credentials");
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("INVALID_CREDENTIALS"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_error_response_with_detail() {
        let response = ErrorResponse::new("TEST_ERROR", "Test error message")
            .with_detail("revoked_sessions", serde_json::json!(3));

        assert_eq!(response.error, "TEST_ERROR");
        assert_eq!(response.details.unwrap()["revoked_sessions"], 3);
    }
}
