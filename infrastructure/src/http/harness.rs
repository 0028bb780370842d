//! Timed request harness backed by `reqwest`.
//!
//! The timer starts right before the request is sent and stops once the body
//! has been read or the failure observed. The deadline wraps the whole
//! exchange, so a slow body counts against it just like a slow connect.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;
use workbench_application::ports::http_client::{
    HttpClientPort, HttpError, HttpRequestSpec, HttpResponse, RequestBody, ResponseBody,
};

/// Default User-Agent for outbound probes
pub const DEFAULT_USER_AGENT: &str = concat!("workbench-mcp/", env!("CARGO_PKG_VERSION"));

/// [`HttpClientPort`] over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(user_agent: &str) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn build(&self, request: &HttpRequestSpec) -> Result<reqwest::RequestBuilder, HttpError> {
        let method = reqwest::Method::from_bytes(request.method_upper().as_bytes())
            .map_err(|_| HttpError::InvalidRequest(format!("invalid method '{}'", request.method)))?;
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidRequest(format!("invalid URL '{}': {}", request.url, e)))?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.effective_body() {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Text(text)) => builder.body(text.clone()),
            None => builder,
        };
        Ok(builder)
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttpClient {
    async fn send(&self, request: &HttpRequestSpec) -> Result<HttpResponse, HttpError> {
        let builder = self.build(request)?;
        let timeout_ms = request.timeout.as_millis() as u64;

        debug!(method = %request.method_upper(), url = %request.url, timeout_ms, "Sending request");
        let started = Instant::now();
        let exchange = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = collect_headers(response.headers());
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, bytes))
        };

        let outcome = tokio::time::timeout(request.timeout, exchange).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Err(_) => Err(HttpError::Timeout {
                timeout_ms,
                duration_ms,
            }),
            Ok(Err(e)) => Err(classify_error(e, timeout_ms, duration_ms)),
            Ok(Ok((status, headers, bytes))) => {
                let body = decode_body(headers.get(CONTENT_TYPE.as_str()), &bytes);
                debug!(status, duration_ms, "Response received");
                Ok(HttpResponse {
                    status,
                    headers,
                    body,
                    duration_ms,
                })
            }
        }
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn classify_error(e: reqwest::Error, timeout_ms: u64, duration_ms: u64) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout {
            timeout_ms,
            duration_ms,
        }
    } else if e.is_connect() {
        HttpError::Connect {
            message: e.to_string(),
            duration_ms,
        }
    } else if e.is_builder() {
        HttpError::InvalidRequest(e.to_string())
    } else {
        HttpError::Transport {
            message: e.to_string(),
            duration_ms,
        }
    }
}

/// JSON when the content type declares it and the body parses, text otherwise
fn decode_body(content_type: Option<&String>, bytes: &[u8]) -> ResponseBody {
    let declares_json = content_type.is_some_and(|ct| {
        let ct = ct.to_ascii_lowercase();
        ct.contains("application/json") || ct.contains("+json")
    });
    if declares_json && let Ok(value) = serde_json::from_slice(bytes) {
        return ResponseBody::Json(value);
    }
    ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned())
}
