//! Recursive structural validation
//!
//! [`validate`] walks a value against a [`Shape`] and accumulates every
//! mismatch it finds. It never fails and keeps no state between calls.

use serde_json::Value;

use super::{Shape, ShapeType};

/// Kind of structural mismatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    MissingRequired,
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

/// A single mismatch, located by its field path (`$` for the root)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn is_missing_required(&self) -> bool {
        matches!(self.kind, ValidationErrorKind::MissingRequired)
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ValidationErrorKind::TypeMismatch { .. })
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ValidationErrorKind::MissingRequired => {
                write!(f, "Missing required field '{}'", self.path)
            }
            ValidationErrorKind::TypeMismatch { expected, actual } => write!(
                f,
                "Field '{}' has wrong type: expected {}, got {}",
                self.path, expected, actual
            ),
        }
    }
}

/// Runtime type tag of a JSON value.
///
/// Arrays report `array` ahead of any other tag; `null` is its own tag.
pub fn runtime_type_tag(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

/// Validate `value` against `shape`, returning mismatches in traversal order.
///
/// Object properties are visited in declaration order. Nested values are only
/// checked when the nested shape is declared (a property's own shape, or an
/// array's `items`).
pub fn validate(value: &Value, shape: &Shape) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_value(value, shape, "", &mut errors);
    errors
}

fn check_value(value: &Value, shape: &Shape, path: &str, errors: &mut Vec<ValidationError>) {
    if !type_matches(value, shape.shape_type) {
        errors.push(ValidationError {
            path: display_path(path),
            kind: ValidationErrorKind::TypeMismatch {
                expected: shape.shape_type.as_str(),
                actual: runtime_type_tag(value),
            },
        });
        return;
    }

    match value {
        Value::Object(map) => {
            for prop in &shape.properties {
                let child_path = join_path(path, &prop.name);
                match map.get(&prop.name) {
                    None => {
                        if shape.is_required(&prop.name) {
                            errors.push(ValidationError {
                                path: child_path,
                                kind: ValidationErrorKind::MissingRequired,
                            });
                        }
                    }
                    Some(child) => check_value(child, &prop.shape, &child_path, errors),
                }
            }
        }
        Value::Array(elements) => {
            if let Some(item_shape) = &shape.items {
                for (index, element) in elements.iter().enumerate() {
                    let child_path = format!("{}[{}]", display_path(path), index);
                    check_value(element, item_shape, &child_path, errors);
                }
            }
        }
        _ => {}
    }
}

fn type_matches(value: &Value, expected: ShapeType) -> bool {
    match expected {
        ShapeType::Any => true,
        ShapeType::Object => value.is_object(),
        ShapeType::Array => value.is_array(),
        ShapeType::String => value.is_string(),
        ShapeType::Boolean => value.is_boolean(),
        ShapeType::Number => value.is_number(),
        ShapeType::Integer => match value {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        },
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_shape() -> Shape {
        Shape::object().with_required_property("id", Shape::number())
    }

    #[test]
    fn test_missing_required_field() {
        let errors = validate(&json!({}), &id_shape());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "id");
        assert!(errors[0].is_missing_required());
    }

    #[test]
    fn test_type_mismatch_names_both_tags() {
        let errors = validate(&json!({"id": "x"}), &id_shape());
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            ValidationErrorKind::TypeMismatch {
                expected: "number",
                actual: "string"
            }
        );
        assert_eq!(
            errors[0].to_string(),
            "Field 'id' has wrong type: expected number, got string"
        );
    }

    #[test]
    fn test_valid_value_has_no_errors() {
        assert!(validate(&json!({"id": 7}), &id_shape()).is_empty());
    }

    #[test]
    fn test_optional_absent_field_is_fine() {
        let shape = id_shape().with_property("name", Shape::string());
        assert!(validate(&json!({"id": 1}), &shape).is_empty());
    }

    #[test]
    fn test_array_tag_takes_precedence() {
        let shape = Shape::object().with_property("tags", Shape::object());
        let errors = validate(&json!({"tags": ["a"]}), &shape);
        assert_eq!(
            errors[0].kind,
            ValidationErrorKind::TypeMismatch {
                expected: "object",
                actual: "array"
            }
        );
    }

    #[test]
    fn test_errors_follow_declaration_order() {
        let shape = Shape::object()
            .with_required_property("b", Shape::string())
            .with_required_property("a", Shape::string())
            .with_property("c", Shape::boolean());

        let errors = validate(&json!({"c": 1}), &shape);
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_nested_declared_shapes_are_checked() {
        let shape = Shape::object().with_required_property(
            "user",
            Shape::object()
                .with_required_property("email", Shape::string())
                .with_property(
                    "roles",
                    Shape::array(Shape::object().with_required_property("name", Shape::string())),
                ),
        );

        let value = json!({"user": {"roles": [{"name": "admin"}, {"name": 3}, {}]}});
        let errors = validate(&value, &shape);
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Missing required field 'user.email'".to_string(),
                "Field 'user.roles[1].name' has wrong type: expected string, got number"
                    .to_string(),
                "Missing required field 'user.roles[2].name'".to_string(),
            ]
        );
    }

    #[test]
    fn test_undeclared_nested_fields_are_not_traversed() {
        let shape = Shape::object().with_property("meta", Shape::object());
        assert!(validate(&json!({"meta": {"anything": [1, 2]}}), &shape).is_empty());
    }

    #[test]
    fn test_root_type_mismatch() {
        let errors = validate(&json!([1, 2]), &id_shape());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$");
    }

    #[test]
    fn test_null_is_its_own_tag() {
        let errors = validate(&json!({"id": null}), &id_shape());
        assert_eq!(
            errors[0].kind,
            ValidationErrorKind::TypeMismatch {
                expected: "number",
                actual: "null"
            }
        );
    }

    #[test]
    fn test_integer_accepts_whole_numbers_only() {
        let shape = Shape::object().with_property("n", Shape::integer());
        assert!(validate(&json!({"n": 3}), &shape).is_empty());
        assert!(validate(&json!({"n": 3.0}), &shape).is_empty());
        assert_eq!(validate(&json!({"n": 3.5}), &shape).len(), 1);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let shape = id_shape().with_property("tags", Shape::array(Shape::string()));
        let value = json!({"tags": ["ok", 1, false]});
        assert_eq!(validate(&value, &shape), validate(&value, &shape));
    }
}
