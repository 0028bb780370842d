//! Tool domain traits
//!
//! Contains pure domain logic traits for tool validation.
//! The async ToolExecutorPort is defined in the application layer (ports).

use super::entities::{ToolCall, ToolDefinition};
use crate::shape::{ValidationError, validate};

/// Validator for tool calls
///
/// This is a pure domain trait that validates tool calls
/// against their definitions without any I/O operations.
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition)
    -> Result<(), Vec<ValidationError>>;
}

/// Checks the argument bag against the definition's input shape
#[derive(Debug, Clone, Default)]
pub struct ShapeToolValidator;

impl ToolValidator for ShapeToolValidator {
    fn validate(
        &self,
        call: &ToolCall,
        definition: &ToolDefinition,
    ) -> Result<(), Vec<ValidationError>> {
        let errors = validate(&call.arguments_value(), &definition.input_shape());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Join validation errors into one argument-error message
pub fn describe_validation_errors(tool_name: &str, errors: &[ValidationError]) -> String {
    let details = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    format!("Invalid arguments for '{}': {}", tool_name, details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeType;
    use crate::tool::entities::{RiskLevel, ToolParameter};

    fn definition() -> ToolDefinition {
        ToolDefinition::new("test", "test tool", RiskLevel::Low)
            .with_parameter(ToolParameter::new("required_param", "A required param", true))
            .with_parameter(
                ToolParameter::new("count", "An optional count", false)
                    .with_type(ShapeType::Integer),
            )
    }

    #[test]
    fn test_validator_missing_required() {
        let call = ToolCall::new("test");
        let errors = ShapeToolValidator.validate(&call, &definition()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_missing_required());
    }

    #[test]
    fn test_validator_wrong_type() {
        let call = ToolCall::new("test")
            .with_arg("required_param", "value")
            .with_arg("count", "three");
        let errors = ShapeToolValidator.validate(&call, &definition()).unwrap_err();
        assert!(errors[0].is_type_mismatch());
    }

    #[test]
    fn test_validator_valid_call() {
        let call = ToolCall::new("test")
            .with_arg("required_param", "value1")
            .with_arg("count", 2);
        assert!(ShapeToolValidator.validate(&call, &definition()).is_ok());
    }

    #[test]
    fn test_describe_validation_errors() {
        let call = ToolCall::new("test").with_arg("count", true);
        let errors = ShapeToolValidator.validate(&call, &definition()).unwrap_err();
        assert_eq!(
            describe_validation_errors("test", &errors),
            "Invalid arguments for 'test': Missing required field 'required_param'; \
             Field 'count' has wrong type: expected integer, got boolean"
        );
    }
}
