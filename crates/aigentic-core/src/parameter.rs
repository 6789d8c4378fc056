//! Schema vocabulary shared by tool inputs, tool outputs and structured agent responses

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
}

impl PrimitiveType {
    pub fn json_type(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PrimitiveValue {
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
}

impl PrimitiveValue {
    pub fn string(value: impl Into<String>) -> Self {
        PrimitiveValue::String(value.into())
    }

    pub fn to_json(&self) -> Value {
        match self {
            PrimitiveValue::String(s) => Value::String(s.clone()),
            PrimitiveValue::Number(n) => json!(n),
            PrimitiveValue::Integer(i) => json!(i),
            PrimitiveValue::Boolean(b) => Value::Bool(*b),
        }
    }
}

/// One node of a tool or response schema.
///
/// `is_required` belongs to the node itself: a required parameter that is absent
/// at runtime is an error. Nullable types map to `is_required = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Parameter {
    Primitive {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        is_required: bool,
        #[serde(rename = "type")]
        primitive_type: PrimitiveType,
    },
    Enum {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        is_required: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<PrimitiveValue>,
        values: Vec<PrimitiveValue>,
        value_type: PrimitiveType,
    },
    Object {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        is_required: bool,
        parameters: Vec<Parameter>,
    },
    Array {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        is_required: bool,
        item_definition: Box<Parameter>,
    },
}

impl Parameter {
    pub fn primitive(name: impl Into<String>, primitive_type: PrimitiveType) -> Self {
        Parameter::Primitive {
            name: name.into(),
            description: None,
            is_required: true,
            primitive_type,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::Boolean)
    }

    /// String-valued enum; the first value becomes the default.
    pub fn string_enum<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<PrimitiveValue> = values
            .into_iter()
            .map(|v| PrimitiveValue::String(v.into()))
            .collect();
        Parameter::Enum {
            name: name.into(),
            description: None,
            is_required: true,
            default: values.first().cloned(),
            values,
            value_type: PrimitiveType::String,
        }
    }

    pub fn object(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Parameter::Object {
            name: name.into(),
            description: None,
            is_required: true,
            parameters,
        }
    }

    pub fn array(name: impl Into<String>, item_definition: Parameter) -> Self {
        Parameter::Array {
            name: name.into(),
            description: None,
            is_required: true,
            item_definition: Box::new(item_definition),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Parameter::Primitive { name, .. }
            | Parameter::Enum { name, .. }
            | Parameter::Object { name, .. }
            | Parameter::Array { name, .. } => name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Parameter::Primitive { description, .. }
            | Parameter::Enum { description, .. }
            | Parameter::Object { description, .. }
            | Parameter::Array { description, .. } => description.as_deref(),
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            Parameter::Primitive { is_required, .. }
            | Parameter::Enum { is_required, .. }
            | Parameter::Object { is_required, .. }
            | Parameter::Array { is_required, .. } => *is_required,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Parameter::Primitive { .. } => "primitive",
            Parameter::Enum { .. } => "enum",
            Parameter::Object { .. } => "object",
            Parameter::Array { .. } => "array",
        }
    }

    pub fn with_name(mut self, new_name: impl Into<String>) -> Self {
        match &mut self {
            Parameter::Primitive { name, .. }
            | Parameter::Enum { name, .. }
            | Parameter::Object { name, .. }
            | Parameter::Array { name, .. } => *name = new_name.into(),
        }
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Parameter::Primitive { description, .. }
            | Parameter::Enum { description, .. }
            | Parameter::Object { description, .. }
            | Parameter::Array { description, .. } => *description = Some(text.into()),
        }
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        match &mut self {
            Parameter::Primitive { is_required, .. }
            | Parameter::Enum { is_required, .. }
            | Parameter::Object { is_required, .. }
            | Parameter::Array { is_required, .. } => *is_required = required,
        }
        self
    }

    pub fn optional(self) -> Self {
        self.with_required(false)
    }

    /// Checks that parameter names are unique within every object of the tree.
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self {
            Parameter::Object {
                name, parameters, ..
            } => {
                validate_unique(name, parameters)?;
                parameters.iter().try_for_each(Parameter::validate)
            }
            Parameter::Array {
                item_definition, ..
            } => item_definition.validate(),
            Parameter::Primitive { .. } => Ok(()),
            Parameter::Enum { name, values, .. } => {
                if values.is_empty() {
                    return Err(SchemaError::InvalidSchema(format!(
                        "enum '{}' declares no values",
                        name
                    )));
                }
                Ok(())
            }
        }
    }

    /// Renders this node as a JSON Schema fragment.
    pub fn to_json_schema(&self) -> Value {
        let mut schema = Map::new();
        match self {
            Parameter::Primitive { primitive_type, .. } => {
                schema.insert("type".into(), json!(primitive_type.json_type()));
            }
            Parameter::Enum {
                default,
                values,
                value_type,
                ..
            } => {
                schema.insert("type".into(), json!(value_type.json_type()));
                schema.insert(
                    "enum".into(),
                    Value::Array(values.iter().map(PrimitiveValue::to_json).collect()),
                );
                if let Some(default) = default {
                    schema.insert("default".into(), default.to_json());
                }
            }
            Parameter::Object { parameters, .. } => {
                schema.insert("type".into(), json!("object"));
                let object = parameters_schema(parameters);
                if let Value::Object(fields) = object {
                    for (key, value) in fields {
                        if key != "type" {
                            schema.insert(key, value);
                        }
                    }
                }
            }
            Parameter::Array {
                item_definition, ..
            } => {
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), item_definition.to_json_schema());
            }
        }
        if let Some(description) = self.description() {
            schema.insert("description".into(), json!(description));
        }
        Value::Object(schema)
    }
}

/// Renders a parameter list as a JSON Schema object with `properties` and `required`.
pub fn parameters_schema(parameters: &[Parameter]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for parameter in parameters {
        properties.insert(parameter.name().to_string(), parameter.to_json_schema());
        if parameter.is_required() {
            required.push(Value::String(parameter.name().to_string()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn validate_unique(object: &str, parameters: &[Parameter]) -> Result<(), SchemaError> {
    let mut seen = std::collections::HashSet::new();
    for parameter in parameters {
        if !seen.insert(parameter.name()) {
            return Err(SchemaError::DuplicateParameter {
                object: object.to_string(),
                name: parameter.name().to_string(),
            });
        }
    }
    Ok(())
}
