//! Timed HTTP request port
//!
//! One outbound request with a deadline and a measured duration. The adapter
//! decides JSON vs text decoding from the declared content type.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use workbench_domain::ToolError;

/// Request body as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`
    Json(Value),
    /// Sent verbatim
    Text(String),
}

impl RequestBody {
    /// Strings are sent verbatim, everything else as JSON
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => RequestBody::Text(s),
            other => RequestBody::Json(other),
        }
    }
}

/// A fully described outbound request
#[derive(Debug, Clone)]
pub struct HttpRequestSpec {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

impl HttpRequestSpec {
    pub fn new(method: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout,
        }
    }

    pub fn with_headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.headers.extend(headers);
        self
    }

    pub fn with_body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    /// Upper-cased method name
    pub fn method_upper(&self) -> String {
        self.method.to_ascii_uppercase()
    }

    /// The body that will actually be sent; `GET` and `HEAD` never carry one
    pub fn effective_body(&self) -> Option<&RequestBody> {
        match self.method_upper().as_str() {
            "GET" | "HEAD" => None,
            _ => self.body.as_ref(),
        }
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// The body as a JSON value (text becomes a JSON string)
    pub fn to_value(&self) -> Value {
        match self {
            ResponseBody::Json(v) => v.clone(),
            ResponseBody::Text(s) => Value::String(s.clone()),
        }
    }
}

/// Normalized response record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
    pub duration_ms: u64,
}

impl HttpResponse {
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

/// Classified request failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64, duration_ms: u64 },

    #[error("Connection failed: {message}")]
    Connect { message: String, duration_ms: u64 },

    #[error("Transport error: {message}")]
    Transport { message: String, duration_ms: u64 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl HttpError {
    /// Time spent before the failure was observed
    pub fn duration_ms(&self) -> u64 {
        match self {
            HttpError::Timeout { duration_ms, .. }
            | HttpError::Connect { duration_ms, .. }
            | HttpError::Transport { duration_ms, .. } => *duration_ms,
            HttpError::InvalidRequest(_) => 0,
        }
    }
}

impl From<HttpError> for ToolError {
    fn from(err: HttpError) -> Self {
        match &err {
            HttpError::Timeout { .. } => {
                ToolError::new(workbench_domain::ErrorCode::Timeout, err.to_string())
            }
            HttpError::Connect { .. } | HttpError::Transport { .. } => {
                ToolError::network_failure(err.to_string())
            }
            HttpError::InvalidRequest(_) => ToolError::invalid_argument(err.to_string()),
        }
    }
}

/// Port for the timed request harness
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn send(&self, request: &HttpRequestSpec) -> Result<HttpResponse, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use workbench_domain::ErrorCode;

    #[test]
    fn test_get_drops_body() {
        let req = HttpRequestSpec::new("get", "http://x", Duration::from_secs(1))
            .with_body(Some(RequestBody::Json(json!({"a": 1}))));
        assert!(req.effective_body().is_none());

        let req = HttpRequestSpec::new("POST", "http://x", Duration::from_secs(1))
            .with_body(Some(RequestBody::Text("hi".into())));
        assert_eq!(req.effective_body(), Some(&RequestBody::Text("hi".into())));
    }

    #[test]
    fn test_request_body_from_value() {
        assert_eq!(
            RequestBody::from_value(json!("raw")),
            RequestBody::Text("raw".into())
        );
        assert_eq!(
            RequestBody::from_value(json!([1])),
            RequestBody::Json(json!([1]))
        );
    }

    #[test]
    fn test_response_serializes_body_untagged() {
        let resp = HttpResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: ResponseBody::Json(json!({"ok": true})),
            duration_ms: 12,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["body"]["ok"], true);
        assert_eq!(json["durationMs"], 12);
    }

    #[test]
    fn test_error_codes() {
        let timeout: ToolError = HttpError::Timeout {
            timeout_ms: 100,
            duration_ms: 100,
        }
        .into();
        assert_eq!(timeout.code, ErrorCode::Timeout);

        let connect: ToolError = HttpError::Connect {
            message: "refused".into(),
            duration_ms: 1,
        }
        .into();
        assert_eq!(connect.code, ErrorCode::NetworkFailure);

        let invalid: ToolError = HttpError::InvalidRequest("bad method".into()).into();
        assert_eq!(invalid.code, ErrorCode::InvalidArgument);
    }
}
