//! Tool domain value objects: handler outputs, errors and the result envelope
//!
//! These types form the **output side** of the tool pipeline. A handler
//! produces either a [`ToolOutput`] or a [`ToolError`]; the dispatcher folds
//! that outcome into exactly one [`ToolResult`] envelope, which is what the
//! calling agent receives.
//!
//! ```text
//! handler ──▶ Result<ToolOutput, ToolError> ──▶ ToolResult { content, isError }
//! ```

use serde::{Deserialize, Serialize};

/// Classification of a tool failure.
///
/// | Code | Raised when |
/// |------|-------------|
/// | `UNKNOWN_TOOL` | No tool is registered under the requested name |
/// | `INVALID_ARGUMENT` | Arguments fail the declared shape or a handler check |
/// | `EXECUTION_FAILED` | External process could not run or reported failure |
/// | `TIMEOUT` | A process or request exceeded its deadline |
/// | `NETWORK_FAILURE` | Connection or transport failure (HTTP, SQL) |
/// | `MALFORMED_DATA` | Upstream data could not be parsed |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownTool,
    InvalidArgument,
    ExecutionFailed,
    Timeout,
    NetworkFailure,
    MalformedData,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnknownTool => "UNKNOWN_TOOL",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::ExecutionFailed => "EXECUTION_FAILED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::NetworkFailure => "NETWORK_FAILURE",
            ErrorCode::MalformedData => "MALFORMED_DATA",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error that occurred during tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl ToolError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownTool, format!("Unknown tool: {}", name.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExecutionFailed, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Operation timed out: {}", operation.into()),
        )
    }

    pub fn network_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkFailure, message)
    }

    pub fn malformed_data(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedData, message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// One block of envelope content. Only text is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}

/// Successful handler output, before it is wrapped into an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: Vec<ContentBlock>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
        }
    }

    /// All blocks joined with newlines
    pub fn to_text(&self) -> String {
        self.content
            .iter()
            .map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Pretty-printed JSON as a single text block
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        serde_json::to_string_pretty(value)
            .map(Self::text)
            .map_err(|e| ToolError::malformed_data(format!("Failed to serialize result: {}", e)))
    }
}

/// The uniform envelope returned for every invocation.
///
/// Serializes as `{"content": [{"type": "text", "text": ...}], "isError": bool}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub is_error: bool,
    /// Failure classification; kept out of the wire format
    #[serde(skip)]
    pub error_code: Option<ErrorCode>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(output: ToolOutput) -> Self {
        Self {
            content: output.content,
            is_error: false,
            error_code: None,
        }
    }

    /// Create a failed result carrying only the error's descriptive text
    pub fn failure(error: &ToolError) -> Self {
        Self {
            content: vec![ContentBlock::text(format!("Error: {}", error.message))],
            is_error: true,
            error_code: Some(error.code),
        }
    }

    /// Fold a handler outcome into an envelope
    pub fn from_outcome(outcome: Result<ToolOutput, ToolError>) -> Self {
        match outcome {
            Ok(output) => Self::success(output),
            Err(error) => Self::failure(&error),
        }
    }

    pub fn is_success(&self) -> bool {
        !self.is_error
    }

    /// Concatenated text of all content blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::unknown_tool("nope");
        assert_eq!(err.code, ErrorCode::UnknownTool);
        assert_eq!(err.to_string(), "[UNKNOWN_TOOL] Unknown tool: nope");
    }

    #[test]
    fn test_success_envelope_wire_format() {
        let result = ToolResult::success(ToolOutput::text("On branch main"));
        assert!(result.is_success());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"content": [{"type": "text", "text": "On branch main"}], "isError": false})
        );
    }

    #[test]
    fn test_failure_envelope_has_single_text_block() {
        let result = ToolResult::failure(&ToolError::timeout("git status"));
        assert!(!result.is_success());
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.text(), "Error: Operation timed out: git status");
        assert_eq!(result.error_code, Some(ErrorCode::Timeout));

        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["isError"], true);
        assert!(wire.get("errorCode").is_none());
    }

    #[test]
    fn test_from_outcome() {
        assert!(ToolResult::from_outcome(Ok(ToolOutput::text("ok"))).is_success());
        assert!(
            !ToolResult::from_outcome(Err(ToolError::invalid_argument("bad"))).is_success()
        );
    }

    #[test]
    fn test_json_output_is_pretty_text() {
        let output = ToolOutput::json(&json!({"type": "feat"})).unwrap();
        assert_eq!(output.content[0].as_text(), "{\n  \"type\": \"feat\"\n}");
    }
}
