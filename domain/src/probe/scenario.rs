//! Endpoint test scenarios and their evaluation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::shape::{Shape, validate};

/// One request to issue against a base URL, with optional expectations
#[derive(Debug, Clone, Deserialize)]
pub struct TestScenario {
    pub name: String,
    #[serde(default)]
    pub method: Option<String>,
    /// Appended to the base URL
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub expected_status: Option<u16>,
    #[serde(default)]
    pub expected_shape: Option<Value>,
}

impl TestScenario {
    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }

    /// Join base URL and scenario path with exactly one slash
    pub fn url(&self, base_url: &str) -> String {
        match self.path.as_deref() {
            None | Some("") => base_url.to_string(),
            Some(path) => format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
        }
    }

    /// Check a response against the scenario's expectations
    pub fn evaluate(&self, status: u16, body: &Value) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(expected) = self.expected_status
            && expected != status
        {
            errors.push(format!("Expected status {}, got {}", expected, status));
        }

        if let Some(raw_shape) = &self.expected_shape {
            match Shape::from_json(raw_shape) {
                Ok(shape) => errors.extend(validate(body, &shape).iter().map(|e| e.to_string())),
                Err(e) => errors.push(format!("Invalid expected_shape: {}", e)),
            }
        }

        errors
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub name: String,
    pub passed: bool,
    pub status: Option<u16>,
    pub duration_ms: Option<u64>,
    pub errors: Vec<String>,
}

impl ScenarioResult {
    pub fn evaluated(name: &str, status: u16, duration_ms: u64, errors: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: errors.is_empty(),
            status: Some(status),
            duration_ms: Some(duration_ms),
            errors,
        }
    }

    /// The request itself failed; no response to check
    pub fn request_failed(name: &str, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            status: None,
            duration_ms: None,
            errors: vec![error.into()],
        }
    }
}

/// Report over all scenarios, in issuance order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<ScenarioResult>,
}

impl EndpointReport {
    pub fn from_results(results: Vec<ScenarioResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario(value: Value) -> TestScenario {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults() {
        let s = scenario(json!({"name": "health"}));
        assert_eq!(s.method(), "GET");
        assert_eq!(s.url("http://localhost:3000"), "http://localhost:3000");
        assert!(s.evaluate(500, &json!(null)).is_empty());
    }

    #[test]
    fn test_url_join() {
        let s = scenario(json!({"name": "users", "path": "/api/users"}));
        assert_eq!(s.url("http://host/"), "http://host/api/users");
        assert_eq!(s.url("http://host"), "http://host/api/users");
    }

    #[test]
    fn test_status_mismatch() {
        let s = scenario(json!({"name": "create", "expected_status": 201}));
        assert_eq!(
            s.evaluate(400, &json!({})),
            vec!["Expected status 201, got 400".to_string()]
        );
    }

    #[test]
    fn test_shape_errors_are_reported() {
        let s = scenario(json!({
            "name": "user",
            "expected_status": 200,
            "expected_shape": {
                "type": "object",
                "properties": {"id": {"type": "number"}, "email": {"type": "string"}},
                "required": ["id", "email"]
            }
        }));

        let errors = s.evaluate(200, &json!({"id": "7"}));
        assert_eq!(
            errors,
            vec![
                "Field 'id' has wrong type: expected number, got string".to_string(),
                "Missing required field 'email'".to_string(),
            ]
        );
        assert!(s.evaluate(200, &json!({"id": 7, "email": "a@b.c"})).is_empty());
    }

    #[test]
    fn test_invalid_expected_shape() {
        let s = scenario(json!({"name": "x", "expected_shape": {"type": "date"}}));
        let errors = s.evaluate(200, &json!({}));
        assert!(errors[0].starts_with("Invalid expected_shape"));
    }

    #[test]
    fn test_report_counts() {
        let report = EndpointReport::from_results(vec![
            ScenarioResult::evaluated("a", 200, 12, vec![]),
            ScenarioResult::request_failed("b", "connection refused"),
        ]);
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.results[1].passed);
    }
}
