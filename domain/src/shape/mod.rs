//! Declared structural shapes
//!
//! A [`Shape`] is the light-weight structural contract used both to advertise
//! tool inputs (rendered as JSON Schema in `tools/list`) and to check values
//! at runtime via [`validate`].
//!
//! Only the subset needed for presence and type-tag checks is modelled:
//!
//! | Keyword | Supported |
//! |---------|-----------|
//! | `type` | `object`, `array`, `string`, `number`, `integer`, `boolean` (absent = any) |
//! | `properties` | yes, declaration order preserved |
//! | `required` | yes |
//! | `items` | yes |
//! | `description` | carried through, not checked |
//! | `$ref`, `oneOf`, `format`, bounds, ... | no |

mod validation;

pub use validation::{ValidationError, ValidationErrorKind, runtime_type_tag, validate};

use serde_json::{Map, Value};

use crate::core::error::DomainError;

/// Type tag of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    /// No `type` keyword: any value is accepted
    Any,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Object => "object",
            ShapeType::Array => "array",
            ShapeType::String => "string",
            ShapeType::Number => "number",
            ShapeType::Integer => "integer",
            ShapeType::Boolean => "boolean",
            ShapeType::Any => "any",
        }
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ShapeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object" => Ok(ShapeType::Object),
            "array" => Ok(ShapeType::Array),
            "string" => Ok(ShapeType::String),
            "number" => Ok(ShapeType::Number),
            "integer" => Ok(ShapeType::Integer),
            "boolean" => Ok(ShapeType::Boolean),
            "any" => Ok(ShapeType::Any),
            other => Err(DomainError::InvalidShape(format!(
                "unsupported type tag '{}'",
                other
            ))),
        }
    }
}

/// A declared property of an object shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeProperty {
    pub name: String,
    pub shape: Shape,
}

/// Declared structural shape
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub shape_type: ShapeType,
    pub description: Option<String>,
    /// Object properties in declaration order
    pub properties: Vec<ShapeProperty>,
    /// Names of required properties
    pub required: Vec<String>,
    /// Element shape for arrays
    pub items: Option<Box<Shape>>,
}

impl Shape {
    pub fn new(shape_type: ShapeType) -> Self {
        Self {
            shape_type,
            description: None,
            properties: Vec::new(),
            required: Vec::new(),
            items: None,
        }
    }

    pub fn object() -> Self {
        Self::new(ShapeType::Object)
    }

    pub fn array(items: Shape) -> Self {
        Self::new(ShapeType::Array).with_items(items)
    }

    pub fn string() -> Self {
        Self::new(ShapeType::String)
    }

    pub fn number() -> Self {
        Self::new(ShapeType::Number)
    }

    pub fn integer() -> Self {
        Self::new(ShapeType::Integer)
    }

    pub fn boolean() -> Self {
        Self::new(ShapeType::Boolean)
    }

    pub fn any() -> Self {
        Self::new(ShapeType::Any)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare an optional property
    pub fn with_property(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.properties.push(ShapeProperty {
            name: name.into(),
            shape,
        });
        self
    }

    /// Declare a required property
    pub fn with_required_property(mut self, name: impl Into<String>, shape: Shape) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.with_property(name, shape)
    }

    pub fn with_items(mut self, items: Shape) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn property(&self, name: &str) -> Option<&Shape> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.shape)
    }

    /// Parse a shape from its JSON Schema subset representation.
    ///
    /// Property order follows the document order of the `properties` map.
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        let obj = value
            .as_object()
            .ok_or_else(|| DomainError::InvalidShape("shape must be a JSON object".into()))?;

        let shape_type = match obj.get("type") {
            None => ShapeType::Any,
            Some(Value::String(tag)) => tag.parse()?,
            Some(other) => {
                return Err(DomainError::InvalidShape(format!(
                    "'type' must be a string, got {}",
                    runtime_type_tag(other)
                )));
            }
        };

        let mut shape = Shape::new(shape_type);
        shape.description = obj
            .get("description")
            .and_then(|d| d.as_str())
            .map(String::from);

        if let Some(props) = obj.get("properties") {
            let props = props.as_object().ok_or_else(|| {
                DomainError::InvalidShape("'properties' must be a JSON object".into())
            })?;
            for (name, prop) in props {
                shape.properties.push(ShapeProperty {
                    name: name.clone(),
                    shape: Shape::from_json(prop)?,
                });
            }
        }

        if let Some(required) = obj.get("required") {
            let required = required.as_array().ok_or_else(|| {
                DomainError::InvalidShape("'required' must be an array of strings".into())
            })?;
            for name in required {
                let name = name.as_str().ok_or_else(|| {
                    DomainError::InvalidShape("'required' must be an array of strings".into())
                })?;
                shape.required.push(name.to_string());
            }
        }

        if let Some(items) = obj.get("items") {
            shape.items = Some(Box::new(Shape::from_json(items)?));
        }

        Ok(shape)
    }

    /// Render as the JSON Schema subset advertised to callers
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if self.shape_type != ShapeType::Any {
            obj.insert("type".into(), Value::from(self.shape_type.as_str()));
        }
        if let Some(description) = &self.description {
            obj.insert("description".into(), Value::from(description.as_str()));
        }
        if self.shape_type == ShapeType::Object || !self.properties.is_empty() {
            let props: Map<String, Value> = self
                .properties
                .iter()
                .map(|p| (p.name.clone(), p.shape.to_json()))
                .collect();
            obj.insert("properties".into(), Value::Object(props));
        }
        if !self.required.is_empty() {
            obj.insert(
                "required".into(),
                Value::Array(self.required.iter().map(|r| Value::from(r.as_str())).collect()),
            );
        }
        if let Some(items) = &self.items {
            obj.insert("items".into(), items.to_json());
        }
        Value::Object(obj)
    }
}
