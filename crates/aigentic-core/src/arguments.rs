//! Parsed tool-call arguments and per-parameter resolution

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::parameter::Parameter;
use crate::traits::tool::ToolError;

/// Arguments supplied by the model for one tool call, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    values: Map<String, Value>,
}

impl ToolArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the JSON-encoded argument string of a tool call.
    ///
    /// An empty string is treated as an empty object; anything other than an object is rejected.
    pub fn parse(json: &str) -> Result<Self, ToolError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str::<Value>(json)? {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(ToolError::InvalidArgument {
                name: "arguments".to_string(),
                message: format!("expected a JSON object, got {}", other),
            }),
        }
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looks up the value for `parameter`. A required parameter with no value is an error;
    /// an explicit `null` counts as absent.
    pub fn resolve(&self, parameter: &Parameter) -> Result<Option<&Value>, ToolError> {
        match self.get(parameter.name()) {
            Some(value) => Ok(Some(value)),
            None if parameter.is_required() => {
                Err(ToolError::MissingArgument(parameter.name().to_string()))
            }
            None => Ok(None),
        }
    }

    /// Resolves every declared parameter, failing on the first missing required one.
    pub fn resolve_all(&self, parameters: &[Parameter]) -> Result<(), ToolError> {
        for parameter in parameters {
            self.resolve(parameter)?;
        }
        Ok(())
    }

    /// Resolves `parameter` and decodes its value into `T`.
    pub fn decode<T: DeserializeOwned>(&self, parameter: &Parameter) -> Result<Option<T>, ToolError> {
        self.resolve(parameter)?
            .map(|value| decode_value(parameter.name(), value))
            .transpose()
    }

    pub fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, ToolError> {
        let value = self
            .get(name)
            .ok_or_else(|| ToolError::MissingArgument(name.to_string()))?;
        decode_value(name, value)
    }

    pub fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ToolError> {
        self.get(name)
            .map(|value| decode_value(name, value))
            .transpose()
    }

    /// Decodes the whole argument object into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.values.clone())).map_err(|e| {
            ToolError::InvalidArgument {
                name: "arguments".to_string(),
                message: e.to_string(),
            }
        })
    }
}

fn decode_value<T: DeserializeOwned>(name: &str, value: &Value) -> Result<T, ToolError> {
    serde_json::from_value(value.clone()).map_err(|e| ToolError::InvalidArgument {
        name: name.to_string(),
        message: e.to_string(),
    })
}

impl From<Map<String, Value>> for ToolArguments {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_parse_object_and_empty() {
        let args = ToolArguments::parse(r#"{"count":10}"#).unwrap();
        assert_eq!(args.into_value(), json!({"count": 10}));
        assert!(ToolArguments::parse("").unwrap().is_empty());
        assert!(ToolArguments::parse("[1,2]").is_err());
        assert!(ToolArguments::parse("{not json").is_err());
    }

    #[test]
    fn test_missing_required_is_error() {
        let args = ToolArguments::parse(r#"{"other":1}"#).unwrap();
        let err = args.resolve(&Parameter::integer("count")).unwrap_err();
        assert_eq!(err, ToolError::MissingArgument("count".to_string()));
        assert_eq!(
            args.resolve(&Parameter::integer("count").optional()).unwrap(),
            None
        );
    }

    #[test]
    fn test_null_counts_as_absent() {
        let args = ToolArguments::parse(r#"{"count":null}"#).unwrap();
        assert!(args.resolve(&Parameter::integer("count")).is_err());
    }

    #[test]
    fn test_decode_nested_object() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Filter {
            topic: String,
            limit: u32,
        }

        let args = ToolArguments::parse(r#"{"filter":{"topic":"rust","limit":3}}"#).unwrap();
        let filter_param = Parameter::object(
            "filter",
            vec![Parameter::string("topic"), Parameter::integer("limit")],
        );
        let filter: Option<Filter> = args.decode(&filter_param).unwrap();
        assert_eq!(
            filter,
            Some(Filter {
                topic: "rust".to_string(),
                limit: 3
            })
        );
    }

    #[test]
    fn test_decode_type_mismatch() {
        let args = ToolArguments::parse(r#"{"count":"ten"}"#).unwrap();
        let err = args.required::<i64>("count").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
    }

    #[test]
    fn test_resolve_all_stops_on_first_missing() {
        let args = ToolArguments::parse(r#"{"a":"x"}"#).unwrap();
        let params = vec![
            Parameter::string("a"),
            Parameter::string("b"),
            Parameter::string("c"),
        ];
        assert_eq!(
            args.resolve_all(&params).unwrap_err(),
            ToolError::MissingArgument("b".to_string())
        );
    }
}
