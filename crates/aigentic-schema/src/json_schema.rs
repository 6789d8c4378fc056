//! Reads type descriptors out of JSON Schema documents generated by `schemars`

use aigentic_core::SchemaError;
use schemars::JsonSchema;
use serde_json::{Map, Value};

use crate::descriptor::{FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};

/// Describes `T` through its `schemars` schema.
///
/// Property order follows the serialized field order; doc comments become descriptions.
pub fn describe<T: JsonSchema>() -> Result<TypeDescriptor, SchemaError> {
    let schema = schemars::schema_for!(T);
    let root = serde_json::to_value(&schema)
        .map_err(|e| SchemaError::InvalidSchema(e.to_string()))?;
    descriptor_from_schema(&root)
}

/// Builds a descriptor from a JSON Schema document, resolving `$ref`s against its `$defs`.
pub fn descriptor_from_schema(root: &Value) -> Result<TypeDescriptor, SchemaError> {
    let name = root
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("root")
        .to_string();
    let mut reader = SchemaReader {
        root,
        ref_stack: Vec::new(),
    };
    reader.read(&name, root)
}

struct SchemaReader<'a> {
    root: &'a Value,
    ref_stack: Vec<String>,
}

impl<'a> SchemaReader<'a> {
    fn read(&mut self, name: &str, schema: &'a Value) -> Result<TypeDescriptor, SchemaError> {
        let object = match schema {
            Value::Object(object) => object,
            Value::Bool(true) => {
                return Ok(TypeDescriptor::unsupported(name, "open type accepts any value"));
            }
            _ => return Err(SchemaError::InvalidSchema(format!("{}: not a schema", name))),
        };

        let description = object
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
            let mut descriptor = self.read_ref(name, reference)?;
            if description.is_some() {
                descriptor.description = description;
            }
            return Ok(descriptor);
        }

        for key in ["anyOf", "oneOf"] {
            if let Some(Value::Array(variants)) = object.get(key) {
                let mut descriptor = self.read_alternatives(name, variants)?;
                if description.is_some() {
                    descriptor.description = description;
                }
                return Ok(descriptor);
            }
        }

        let (type_name, mut nullable) = declared_type(object);
        if object.get("nullable").and_then(Value::as_bool) == Some(true) {
            nullable = true;
        }
        let title = object
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string();

        let kind = if let Some(Value::Array(values)) = object.get("enum") {
            enum_kind(values)
        } else {
            match type_name.as_deref() {
                Some("string") => TypeKind::Primitive(string_kind(object)),
                Some("integer") => TypeKind::Primitive(integer_kind(object)),
                Some("number") => TypeKind::Primitive(number_kind(object)),
                Some("boolean") => TypeKind::Primitive(PrimitiveKind::Boolean),
                Some("array") => self.array_kind(&title, object)?,
                Some("object") => self.object_kind(object)?,
                Some(other) => TypeKind::Unsupported(format!("type '{}' has no parameter form", other)),
                None if object.contains_key("properties") => self.object_kind(object)?,
                None => TypeKind::Unsupported("schema declares no type".to_string()),
            }
        };

        Ok(TypeDescriptor {
            name: title,
            kind,
            nullable,
            description,
        })
    }

    fn read_ref(&mut self, name: &str, reference: &str) -> Result<TypeDescriptor, SchemaError> {
        if self.ref_stack.iter().any(|r| r == reference) {
            return Ok(TypeDescriptor::unsupported(
                name,
                format!("recursive reference {}", reference),
            ));
        }
        let target = resolve_ref(self.root, reference).ok_or_else(|| {
            SchemaError::InvalidSchema(format!("unresolved reference {}", reference))
        })?;
        self.ref_stack.push(reference.to_string());
        let result = self.read(name, target);
        self.ref_stack.pop();
        result
    }

    fn read_alternatives(
        &mut self,
        name: &str,
        variants: &'a [Value],
    ) -> Result<TypeDescriptor, SchemaError> {
        let (nulls, others): (Vec<&Value>, Vec<&Value>) = variants.iter().partition(|v| is_null_schema(v));

        if let Some(values) = const_values(&others) {
            let mut descriptor = TypeDescriptor::enumeration(name, values);
            descriptor.nullable = !nulls.is_empty();
            return Ok(descriptor);
        }

        match others.as_slice() {
            [single] => {
                let mut descriptor = self.read(name, *single)?;
                if !nulls.is_empty() {
                    descriptor.nullable = true;
                }
                Ok(descriptor)
            }
            _ => Ok(TypeDescriptor::unsupported(
                name,
                "unions of several types are not supported",
            )),
        }
    }

    fn array_kind(&mut self, name: &str, object: &'a Map<String, Value>) -> Result<TypeKind, SchemaError> {
        match object.get("items") {
            Some(items @ Value::Object(_)) => {
                let item = self.read(name, items)?;
                Ok(TypeKind::List(Box::new(item)))
            }
            Some(_) | None if object.contains_key("prefixItems") => {
                Ok(TypeKind::Unsupported("tuples are not supported".to_string()))
            }
            _ => Ok(TypeKind::Unsupported(
                "arrays without an item schema are not supported".to_string(),
            )),
        }
    }

    fn object_kind(&mut self, object: &'a Map<String, Value>) -> Result<TypeKind, SchemaError> {
        let properties = match object.get("properties") {
            Some(Value::Object(properties)) => properties,
            _ => {
                return Ok(match object.get("additionalProperties") {
                    Some(Value::Bool(false)) | None => TypeKind::Class(Vec::new()),
                    Some(_) => TypeKind::Unsupported("maps are not supported".to_string()),
                });
            }
        };

        let mut fields = Vec::with_capacity(properties.len());
        for (field_name, field_schema) in properties {
            let descriptor = self.read(field_name, field_schema)?;
            let has_default = field_schema.get("default").is_some();
            let description = descriptor.description.clone();
            fields.push(FieldDescriptor {
                name: field_name.clone(),
                descriptor,
                description,
                has_default,
            });
        }
        Ok(TypeKind::Class(fields))
    }
}

fn declared_type(object: &Map<String, Value>) -> (Option<String>, bool) {
    match object.get("type") {
        Some(Value::String(t)) => (Some(t.clone()), t == "null"),
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|t| t.as_str() == Some("null"));
            let concrete: Vec<&str> = types
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| *t != "null")
                .collect();
            match concrete.as_slice() {
                [single] => (Some(single.to_string()), nullable),
                [] => (None, nullable),
                _ => (Some("union".to_string()), nullable),
            }
        }
        _ => (None, false),
    }
}

fn enum_kind(values: &[Value]) -> TypeKind {
    let members: Vec<String> = values
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    if members.is_empty() {
        TypeKind::Unsupported("enum declares no members".to_string())
    } else {
        TypeKind::Enum(members)
    }
}

fn const_values(variants: &[&Value]) -> Option<Vec<String>> {
    if variants.is_empty() {
        return None;
    }
    variants
        .iter()
        .map(|v| v.get("const").and_then(Value::as_str).map(str::to_string))
        .collect()
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

fn string_kind(object: &Map<String, Value>) -> PrimitiveKind {
    let single_char = object.get("minLength").and_then(Value::as_u64) == Some(1)
        && object.get("maxLength").and_then(Value::as_u64) == Some(1);
    if single_char {
        PrimitiveKind::Char
    } else {
        PrimitiveKind::String
    }
}

fn integer_kind(object: &Map<String, Value>) -> PrimitiveKind {
    match object.get("format").and_then(Value::as_str) {
        Some("int8" | "uint8") => PrimitiveKind::Byte,
        Some("int16" | "uint16") => PrimitiveKind::Short,
        Some("int32" | "uint32") => PrimitiveKind::Int,
        _ => PrimitiveKind::Long,
    }
}

fn number_kind(object: &Map<String, Value>) -> PrimitiveKind {
    match object.get("format").and_then(Value::as_str) {
        Some("float") => PrimitiveKind::Float,
        _ => PrimitiveKind::Double,
    }
}

fn resolve_ref<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    root.pointer(pointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ParameterMapper;
    use aigentic_core::Parameter;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[test]
    fn test_reads_handwritten_schema_with_refs() {
        let schema = json!({
            "title": "Report",
            "type": "object",
            "description": "A report",
            "properties": {
                "title": { "type": "string", "description": "Headline" },
                "pages": { "type": "integer", "format": "int32" },
                "score": { "type": ["number", "null"], "format": "double" },
                "level": { "$ref": "#/$defs/Level" },
                "author": {
                    "anyOf": [ { "$ref": "#/$defs/Author" }, { "type": "null" } ]
                },
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["title", "pages", "level", "tags"],
            "$defs": {
                "Level": { "type": "string", "enum": ["Low", "High"] },
                "Author": {
                    "type": "object",
                    "properties": { "name": { "type": "string" } },
                    "required": ["name"]
                }
            }
        });

        let descriptor = descriptor_from_schema(&schema).unwrap();
        let parameter = ParameterMapper::new().map("report", &descriptor).unwrap();

        let expected = Parameter::object(
            "report",
            vec![
                Parameter::string("title").with_description("Headline"),
                Parameter::integer("pages"),
                Parameter::number("score").optional(),
                Parameter::string_enum("level", ["Low", "High"]),
                Parameter::object("author", vec![Parameter::string("name")]).optional(),
                Parameter::array("tags", Parameter::string("Item")),
            ],
        )
        .with_description("A report");

        assert_eq!(parameter, expected);
    }

    #[test]
    fn test_map_schema_is_unsupported() {
        let schema = json!({
            "type": "object",
            "properties": {
                "scores": { "type": "object", "additionalProperties": { "type": "integer" } }
            }
        });
        let descriptor = descriptor_from_schema(&schema).unwrap();
        let err = ParameterMapper::new().map("root", &descriptor).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedType { ref field, .. } if field == "root.scores"));
    }

    #[test]
    fn test_union_is_unsupported() {
        let schema = json!({
            "type": "object",
            "properties": {
                "value": { "anyOf": [ { "type": "string" }, { "type": "integer" } ] }
            }
        });
        let descriptor = descriptor_from_schema(&schema).unwrap();
        assert!(ParameterMapper::new().map("root", &descriptor).is_err());
    }

    #[test]
    fn test_const_variants_read_as_enum() {
        let schema = json!({
            "oneOf": [
                { "const": "FinishedAllTasks", "type": "string" },
                { "const": "ImStuck", "type": "string" }
            ]
        });
        let descriptor = descriptor_from_schema(&schema).unwrap();
        assert_eq!(
            descriptor.kind,
            TypeKind::Enum(vec!["FinishedAllTasks".to_string(), "ImStuck".to_string()])
        );
    }

    #[allow(dead_code)]
    #[derive(Serialize, Deserialize, JsonSchema)]
    struct NewsEvent {
        /// Headline of the event
        title: String,
        year: i32,
        summary: Option<String>,
        keywords: Vec<String>,
    }

    #[test]
    fn test_describe_derived_struct() {
        let descriptor = describe::<NewsEvent>().unwrap();
        let parameter = ParameterMapper::new().map("event", &descriptor).unwrap();
        let expected = Parameter::object(
            "event",
            vec![
                Parameter::string("title").with_description("Headline of the event"),
                Parameter::integer("year"),
                Parameter::string("summary").optional(),
                Parameter::array("keywords", Parameter::string("Item")),
            ],
        );
        assert_eq!(parameter, expected);
    }
}
