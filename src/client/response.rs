//! Outcome of a single API call
//!
//! Callers of [`super::ApiClient::request`] always get one of these back,
//! never an `Err`. The serialized form matches what UI layers expect:
//! `{"data": ..., "statusCode": 200}` or `{"error": "...", "statusCode": 404}`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RequestError, Result};

/// Result of an API call as a plain value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    /// 2xx response with a parseable (or empty) JSON body
    Success {
        data: Value,
        #[serde(rename = "statusCode")]
        status_code: u16,
    },

    /// Network failure, non-2xx status, or malformed JSON
    Failure {
        error: String,
        #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },
}

impl ApiResponse {
    pub(crate) fn failure(error: impl Into<String>, status_code: Option<u16>) -> Self {
        ApiResponse::Failure {
            error: error.into(),
            status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    /// HTTP status, if a response was received at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiResponse::Success { status_code, .. } => Some(*status_code),
            ApiResponse::Failure { status_code, .. } => *status_code,
        }
    }

    /// Error message for failed calls
    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResponse::Success { .. } => None,
            ApiResponse::Failure { error, .. } => Some(error),
        }
    }

    /// Lift the response into a `Result`, keeping only the JSON payload
    pub fn into_result(self) -> std::result::Result<Value, RequestError> {
        match self {
            ApiResponse::Success { data, .. } => Ok(data),
            ApiResponse::Failure { error, status_code } => Err(RequestError {
                message: error,
                status_code,
            }),
        }
    }

    /// Deserialize a successful payload into `T`
    ///
    /// A payload that does not match `T` is reported as a request error
    /// carrying the original status code.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T> {
        let status_code = self.status_code();
        let data = self.into_result()?;
        serde_json::from_value(data).map_err(|e| {
            RequestError {
                message: format!("Unexpected response shape: {e}"),
                status_code,
            }
            .into()
        })
    }
}

/// Pull a human readable message out of an error body
///
/// The API answers failures with either `{"message": ...}` or
/// `{"errors": [{"message": ...}]}`. Anything else falls back to the status
/// line plus the raw body.
pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        let first = value
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str);
        if let Some(message) = first {
            return message.to_string();
        }
    }

    let reason = status.canonical_reason().unwrap_or("Request failed");
    let body = body.trim();
    if body.is_empty() {
        format!("{} {reason}", status.as_u16())
    } else {
        format!("{} {reason}: {body}", status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_success_serializes_camel_case() {
        let response = ApiResponse::Success {
            data: json!({"id": "1"}),
            status_code: 200,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"data": {"id": "1"}, "statusCode": 200}));
    }

    #[test]
    fn test_failure_without_status_omits_field() {
        let response = ApiResponse::failure("connection refused", None);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"error": "connection refused"}));
    }

    #[test]
    fn test_into_result_keeps_status() {
        let err = ApiResponse::failure("Forbidden", Some(403))
            .into_result()
            .unwrap_err();
        assert_eq!(err.status_code, Some(403));
        assert_eq!(err.message, "Forbidden");
    }

    #[test]
    fn test_parse_shape_mismatch_is_error() {
        let response = ApiResponse::Success {
            data: json!("not an object"),
            status_code: 200,
        };
        let parsed: Result<std::collections::HashMap<String, String>> = response.parse();
        assert!(parsed.is_err());
    }

    #[test]
    fn test_error_message_variants() {
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, r#"{"message":"Bad credentials"}"#),
            "Bad credentials"
        );
        assert_eq!(
            error_message(
                StatusCode::BAD_REQUEST,
                r#"{"errors":[{"code":"x","message":"Invalid field"}]}"#
            ),
            "Invalid field"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, ""),
            "502 Bad Gateway"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, "nope"),
            "404 Not Found: nope"
        );
    }
}
