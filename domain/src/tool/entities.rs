//! Tool domain entities

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::error::DomainError;
use crate::shape::{Shape, ShapeType};

/// Risk level of a tool operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk - read-only operations (e.g., git_status, docker_ps)
    Low,
    /// High risk - operations that modify state (e.g., git_push, docker_exec)
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::High => "high",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, RiskLevel::Low)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of a tool advertised to the calling agent
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "git_status")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Risk level of this tool
    pub risk_level: RiskLevel,
    /// Parameter specifications, in declaration order
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Declared shape of the parameter value
    pub shape: Shape,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            risk_level,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn is_high_risk(&self) -> bool {
        !self.risk_level.is_read_only()
    }

    /// The object shape that tool arguments must satisfy
    pub fn input_shape(&self) -> Shape {
        self.parameters.iter().fold(Shape::object(), |shape, param| {
            let prop = param.shape.clone().with_description(param.description.clone());
            if param.required {
                shape.with_required_property(param.name.clone(), prop)
            } else {
                shape.with_property(param.name.clone(), prop)
            }
        })
    }
}

impl ToolParameter {
    /// New parameter; the shape defaults to `string`
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            shape: Shape::string(),
        }
    }

    pub fn with_type(mut self, shape_type: ShapeType) -> Self {
        self.shape.shape_type = shape_type;
        self
    }

    /// Replace the whole declared shape (for arrays and nested objects)
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

/// Registry of the tools one server exposes.
///
/// Append-only: names are unique and listing follows registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool, rejecting duplicate names
    pub fn register(mut self, tool: ToolDefinition) -> Result<Self, DomainError> {
        if self.index.contains_key(&tool.name) {
            return Err(DomainError::DuplicateTool(tool.name));
        }
        self.index.insert(tool.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(self)
    }

    /// Build a spec from a list of definitions
    pub fn from_definitions(
        tools: impl IntoIterator<Item = ToolDefinition>,
    ) -> Result<Self, DomainError> {
        tools
            .into_iter()
            .try_fold(ToolSpec::new(), |spec, tool| spec.register(tool))
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All definitions in registration order
    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A call to a tool with arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Build a call from a JSON arguments object (`null` = no arguments)
    pub fn from_json(
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Result<Self, String> {
        let arguments = match arguments {
            serde_json::Value::Null => HashMap::new(),
            serde_json::Value::Object(map) => map.into_iter().collect(),
            other => {
                return Err(format!(
                    "arguments must be a JSON object, got {}",
                    crate::shape::runtime_type_tag(&other)
                ));
            }
        };
        Ok(Self {
            tool_name: tool_name.into(),
            arguments,
        })
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get an optional i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// The argument bag as a single JSON object
    pub fn arguments_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Deserialize the argument bag into a typed record
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_value(self.arguments_value())
            .map_err(|e| format!("Invalid arguments for '{}': {}", self.tool_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_risk_level() {
        assert!(RiskLevel::Low.is_read_only());
        assert!(!RiskLevel::High.is_read_only());
    }

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("git_log", "Show commit history", RiskLevel::Low)
            .with_parameter(ToolParameter::new("path", "Repository path", false))
            .with_parameter(
                ToolParameter::new("limit", "Number of commits", false)
                    .with_type(ShapeType::Integer),
            );

        assert_eq!(tool.name, "git_log");
        assert!(!tool.is_high_risk());
        assert_eq!(tool.parameters.len(), 2);
        assert_eq!(tool.parameters[1].shape.shape_type, ShapeType::Integer);
    }

    #[test]
    fn test_input_shape_carries_required_and_descriptions() {
        let tool = ToolDefinition::new("git_blame", "Blame a file", RiskLevel::Low)
            .with_parameter(ToolParameter::new("file", "File to annotate", true))
            .with_parameter(ToolParameter::new("path", "Repository path", false));

        let shape = tool.input_shape();
        assert_eq!(shape.shape_type, ShapeType::Object);
        assert_eq!(shape.required, vec!["file".to_string()]);
        assert_eq!(
            shape.property("file").unwrap().description.as_deref(),
            Some("File to annotate")
        );
    }

    #[test]
    fn test_tool_spec_keeps_registration_order() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("b_tool", "B", RiskLevel::Low))
            .unwrap()
            .register(ToolDefinition::new("a_tool", "A", RiskLevel::High))
            .unwrap();

        assert_eq!(spec.names().collect::<Vec<_>>(), vec!["b_tool", "a_tool"]);
        assert!(spec.get("a_tool").unwrap().is_high_risk());
        assert!(spec.get("unknown").is_none());
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_tool_spec_rejects_duplicates() {
        let result = ToolSpec::from_definitions([
            ToolDefinition::new("git_status", "Status", RiskLevel::Low),
            ToolDefinition::new("git_status", "Status again", RiskLevel::Low),
        ]);
        assert_eq!(
            result.unwrap_err(),
            DomainError::DuplicateTool("git_status".to_string())
        );
    }

    #[test]
    fn test_tool_call() {
        let call = ToolCall::new("git_blame").with_arg("file", "src/main.rs");

        assert_eq!(call.tool_name, "git_blame");
        assert_eq!(call.get_string("file"), Some("src/main.rs"));
        assert_eq!(call.get_i64("file"), None);
        assert_eq!(call.arguments_value(), json!({"file": "src/main.rs"}));
    }

    #[test]
    fn test_tool_call_from_json() {
        let call = ToolCall::from_json("git_status", json!(null)).unwrap();
        assert!(call.arguments.is_empty());

        let call = ToolCall::from_json("git_log", json!({"limit": 3})).unwrap();
        assert_eq!(call.get_i64("limit"), Some(3));

        assert!(ToolCall::from_json("git_log", json!([1])).is_err());
    }

    #[test]
    fn test_parse_args() {
        #[derive(Deserialize)]
        struct Args {
            file: String,
            #[serde(default)]
            limit: Option<u32>,
        }

        let call = ToolCall::new("git_blame").with_arg("file", "a.rs");
        let args: Args = call.parse_args().unwrap();
        assert_eq!(args.file, "a.rs");
        assert_eq!(args.limit, None);

        let bad = ToolCall::new("git_blame").with_arg("file", 3);
        let err = bad.parse_args::<Args>().err().unwrap();
        assert!(err.contains("git_blame"));
    }
}
