//! http server: single requests, scenario checks and load probes
//!
//! Multi-request tools issue their requests strictly one after another and
//! record results in issuance order. A failed sub-request becomes one failed
//! entry; it does not abort the invocation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use workbench_application::{ExecutionParams, HttpClientPort, HttpRequestSpec, RequestBody};
use workbench_domain::{
    EndpointReport, PerformanceSummary, RequestTiming, RiskLevel, ScenarioResult, Shape,
    ShapeType, TestScenario, ToolCall, ToolDefinition, ToolError, ToolOutput, ToolParameter,
    tool::provider::{ProviderError, ToolProvider},
};

use super::{parse_args, unknown};

pub const HTTP_REQUEST: &str = "http_request";
pub const TEST_ENDPOINT: &str = "test_endpoint";
pub const PERFORMANCE_TEST: &str = "performance_test";

fn headers_parameter() -> ToolParameter {
    ToolParameter::new("headers", "Request headers", false).with_type(ShapeType::Object)
}

fn body_parameter() -> ToolParameter {
    ToolParameter::new(
        "body",
        "Request body; objects are sent as JSON, strings as-is. Ignored for GET.",
        false,
    )
    .with_shape(Shape::any())
}

fn timeout_parameter() -> ToolParameter {
    ToolParameter::new("timeout_ms", "Per-request timeout in milliseconds", false)
        .with_type(ShapeType::Integer)
}

fn scenario_shape() -> Shape {
    Shape::object()
        .with_required_property("name", Shape::string())
        .with_property("method", Shape::string())
        .with_property("path", Shape::string().with_description("Appended to base_url"))
        .with_property("headers", Shape::object())
        .with_property("body", Shape::any())
        .with_property("expected_status", Shape::integer())
        .with_property(
            "expected_shape",
            Shape::object().with_description("Structural shape the JSON body must satisfy"),
        )
}

pub fn definitions(max_requests: usize) -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            HTTP_REQUEST,
            "Send one HTTP request and return status, headers, body and duration",
            RiskLevel::High,
        )
        .with_parameter(ToolParameter::new("url", "Target URL", true))
        .with_parameter(ToolParameter::new("method", "HTTP method (default: GET)", false))
        .with_parameter(headers_parameter())
        .with_parameter(body_parameter())
        .with_parameter(timeout_parameter()),
        ToolDefinition::new(
            TEST_ENDPOINT,
            "Run request scenarios against a base URL and check status and response shape",
            RiskLevel::High,
        )
        .with_parameter(ToolParameter::new("base_url", "Base URL of the service", true))
        .with_parameter(
            ToolParameter::new("scenarios", "Scenarios to run in order", true)
                .with_shape(Shape::array(scenario_shape())),
        )
        .with_parameter(timeout_parameter()),
        ToolDefinition::new(
            PERFORMANCE_TEST,
            "Send the same request repeatedly and report latency statistics",
            RiskLevel::High,
        )
        .with_parameter(ToolParameter::new("url", "Target URL", true))
        .with_parameter(ToolParameter::new("method", "HTTP method (default: GET)", false))
        .with_parameter(headers_parameter())
        .with_parameter(body_parameter())
        .with_parameter(
            ToolParameter::new(
                "requests",
                format!("Number of requests (default: 10, max: {})", max_requests),
                false,
            )
            .with_type(ShapeType::Integer),
        )
        .with_parameter(timeout_parameter()),
    ]
}

#[derive(Debug, Deserialize)]
struct RequestArgs {
    url: String,
    method: Option<String>,
    #[serde(default)]
    headers: HashMap<String, String>,
    body: Option<Value>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EndpointArgs {
    base_url: String,
    scenarios: Vec<TestScenario>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PerformanceArgs {
    url: String,
    method: Option<String>,
    #[serde(default)]
    headers: HashMap<String, String>,
    body: Option<Value>,
    requests: Option<usize>,
    timeout_ms: Option<u64>,
}

/// Provider for the http server
pub struct HttpProvider {
    client: Arc<dyn HttpClientPort>,
    params: ExecutionParams,
}

impl HttpProvider {
    pub fn new(client: Arc<dyn HttpClientPort>, params: ExecutionParams) -> Self {
        Self { client, params }
    }

    fn build_request(
        &self,
        method: Option<&str>,
        url: String,
        headers: HashMap<String, String>,
        body: Option<Value>,
        timeout_ms: Option<u64>,
    ) -> HttpRequestSpec {
        HttpRequestSpec::new(
            method.unwrap_or("GET"),
            url,
            self.params.http_timeout_or(timeout_ms),
        )
        .with_headers(headers)
        .with_body(body.map(RequestBody::from_value))
    }

    async fn request(&self, args: RequestArgs) -> Result<ToolOutput, ToolError> {
        let spec = self.build_request(
            args.method.as_deref(),
            args.url,
            args.headers,
            args.body,
            args.timeout_ms,
        );
        debug!(method = %spec.method_upper(), url = %spec.url, "Sending request");
        let response = self.client.send(&spec).await?;
        ToolOutput::json(&response)
    }

    async fn test_endpoint(&self, args: EndpointArgs) -> Result<ToolOutput, ToolError> {
        if args.scenarios.is_empty() {
            return Err(ToolError::invalid_argument("scenarios cannot be empty"));
        }

        let mut results = Vec::with_capacity(args.scenarios.len());
        for scenario in &args.scenarios {
            let spec = self.build_request(
                Some(scenario.method()),
                scenario.url(&args.base_url),
                scenario.headers.clone(),
                scenario.body.clone(),
                args.timeout_ms,
            );
            let result = match self.client.send(&spec).await {
                Ok(response) => {
                    let errors = scenario.evaluate(response.status, &response.body.to_value());
                    ScenarioResult::evaluated(
                        &scenario.name,
                        response.status,
                        response.duration_ms,
                        errors,
                    )
                }
                Err(e) => ScenarioResult::request_failed(&scenario.name, e.to_string()),
            };
            debug!(scenario = %scenario.name, passed = result.passed, "Scenario finished");
            results.push(result);
        }

        let report = EndpointReport::from_results(results);
        info!(
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            "Endpoint test finished"
        );
        ToolOutput::json(&report)
    }

    async fn performance_test(&self, args: PerformanceArgs) -> Result<ToolOutput, ToolError> {
        let requests = args.requests.unwrap_or(self.params.default_requests);
        if requests == 0 || requests > self.params.max_requests {
            return Err(ToolError::invalid_argument(format!(
                "requests must be between 1 and {}",
                self.params.max_requests
            )));
        }

        let spec = self.build_request(
            args.method.as_deref(),
            args.url,
            args.headers,
            args.body,
            args.timeout_ms,
        );

        let mut timings = Vec::with_capacity(requests);
        for index in 1..=requests {
            let timing = match self.client.send(&spec).await {
                Ok(response) if response.is_error_status() => RequestTiming::failure(
                    response.duration_ms,
                    format!("Request {}: HTTP {}", index, response.status),
                ),
                Ok(response) => RequestTiming::success(response.duration_ms),
                Err(e) => RequestTiming::failure(e.duration_ms(), format!("Request {}: {}", index, e)),
            };
            timings.push(timing);
        }

        let summary = PerformanceSummary::from_timings(&timings);
        info!(
            url = %spec.url,
            count = summary.count,
            failures = summary.failure_count,
            average_ms = summary.average_millis,
            "Performance test finished"
        );
        ToolOutput::json(&summary)
    }
}

#[async_trait]
impl ToolProvider for HttpProvider {
    fn id(&self) -> &str {
        "http"
    }

    fn display_name(&self) -> &str {
        "HTTP"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(definitions(self.params.max_requests))
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        match call.tool_name.as_str() {
            HTTP_REQUEST => self.request(parse_args(call)?).await,
            TEST_ENDPOINT => self.test_endpoint(parse_args(call)?).await,
            PERFORMANCE_TEST => self.performance_test(parse_args(call)?).await,
            _ => Err(unknown(call)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::FakeHttp;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use workbench_application::{HttpError, HttpResponse, ResponseBody};
    use workbench_domain::ErrorCode;

    fn response(status: u16, body: Value, duration_ms: u64) -> HttpResponse {
        HttpResponse {
            status,
            headers: BTreeMap::new(),
            body: ResponseBody::Json(body),
            duration_ms,
        }
    }

    fn provider(client: FakeHttp) -> (HttpProvider, Arc<FakeHttp>) {
        let client = Arc::new(client);
        let params = ExecutionParams::default().with_max_requests(5);
        (HttpProvider::new(client.clone(), params), client)
    }

    fn parse(out: &ToolOutput) -> Value {
        serde_json::from_str(&out.to_text()).unwrap()
    }

    #[tokio::test]
    async fn test_http_request_returns_record() {
        let (http, client) = provider(FakeHttp::new().with_response(response(404, json!({"error": "nope"}), 12)));
        let call = ToolCall::new(HTTP_REQUEST)
            .with_arg("url", "http://svc/items")
            .with_arg("method", "post")
            .with_arg("headers", json!({"x-trace": "1"}))
            .with_arg("body", json!({"name": "a"}))
            .with_arg("timeout_ms", 250);
        let out = http.execute(&call).await.unwrap();

        let record = parse(&out);
        assert_eq!(record["status"], 404);
        assert_eq!(record["body"]["error"], "nope");
        assert_eq!(record["durationMs"], 12);

        let sent = &client.requests()[0];
        assert_eq!(sent.method_upper(), "POST");
        assert_eq!(sent.timeout, Duration::from_millis(250));
        assert_eq!(sent.headers.get("x-trace").map(String::as_str), Some("1"));
        assert_eq!(sent.body, Some(RequestBody::Json(json!({"name": "a"}))));
    }

    #[tokio::test]
    async fn test_http_request_timeout_is_failure() {
        let (http, _) = provider(FakeHttp::new().with_error(HttpError::Timeout {
            timeout_ms: 100,
            duration_ms: 100,
        }));
        let err = http
            .execute(&ToolCall::new(HTTP_REQUEST).with_arg("url", "http://svc"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Timeout);
    }

    #[tokio::test]
    async fn test_endpoint_scenarios_run_in_order() {
        let (http, client) = provider(
            FakeHttp::new()
                .with_response(response(200, json!({"id": 1}), 5))
                .with_response(response(200, json!({"id": "x"}), 6))
                .with_error(HttpError::Connect {
                    message: "refused".into(),
                    duration_ms: 1,
                }),
        );
        let shape = json!({"type": "object", "properties": {"id": {"type": "number"}}, "required": ["id"]});
        let call = ToolCall::new(TEST_ENDPOINT)
            .with_arg("base_url", "http://svc/api/")
            .with_arg(
                "scenarios",
                json!([
                    {"name": "ok", "path": "/items/1", "expected_status": 200, "expected_shape": shape},
                    {"name": "bad shape", "path": "items/2", "expected_shape": shape},
                    {"name": "down", "method": "DELETE", "path": "items/3"}
                ]),
            );
        let report = parse(&http.execute(&call).await.unwrap());

        assert_eq!(report["total"], 3);
        assert_eq!(report["passed"], 1);
        assert_eq!(report["failed"], 2);
        assert_eq!(report["results"][0]["name"], "ok");
        assert_eq!(
            report["results"][1]["errors"][0],
            "Field 'id' has wrong type: expected number, got string"
        );
        assert_eq!(report["results"][2]["status"], Value::Null);

        let urls: Vec<String> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec!["http://svc/api/items/1", "http://svc/api/items/2", "http://svc/api/items/3"]
        );
    }

    #[tokio::test]
    async fn test_performance_aggregates_successes_and_failures() {
        let (http, client) = provider(
            FakeHttp::new()
                .with_response(response(200, json!({}), 10))
                .with_response(response(500, json!({}), 40))
                .with_response(response(200, json!({}), 20))
                .with_error(HttpError::Timeout {
                    timeout_ms: 50,
                    duration_ms: 50,
                })
                .with_response(response(200, json!({}), 30)),
        );
        let call = ToolCall::new(PERFORMANCE_TEST)
            .with_arg("url", "http://svc/health")
            .with_arg("requests", 5);
        let summary = parse(&http.execute(&call).await.unwrap());

        assert_eq!(summary["count"], 5);
        assert_eq!(summary["successCount"], 3);
        assert_eq!(summary["failureCount"], 2);
        assert_eq!(summary["averageMillis"], 20.0);
        assert_eq!(summary["minMillis"], 10);
        assert_eq!(summary["maxMillis"], 30);
        assert_eq!(summary["rawDurations"], json!([10, 40, 20, 50, 30]));
        assert_eq!(summary["rawErrors"][0], "Request 2: HTTP 500");
        assert_eq!(client.requests().len(), 5);
    }

    #[tokio::test]
    async fn test_performance_rejects_too_many_requests() {
        let (http, client) = provider(FakeHttp::new());
        let call = ToolCall::new(PERFORMANCE_TEST)
            .with_arg("url", "http://svc")
            .with_arg("requests", 6);
        let err = http.execute(&call).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_definitions_advertise_max_requests() {
        let (http, _) = provider(FakeHttp::new());
        let tools = http.discover_tools().await.unwrap();
        let perf = tools.iter().find(|t| t.name == PERFORMANCE_TEST).unwrap();
        let requests = perf.parameters.iter().find(|p| p.name == "requests").unwrap();
        assert!(requests.description.contains("max: 5"));
    }
}
