//! Converts type descriptors into `Parameter` trees

use aigentic_core::{Parameter, PrimitiveType, PrimitiveValue, SchemaError};

use crate::descriptor::{FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};

const DEFAULT_ITEM_NAME: &str = "Item";

/// Maps a `TypeDescriptor` onto exactly one `Parameter` of the same shape.
///
/// Integer widths collapse to `Integer` and floating kinds to `Number`. Required-ness follows
/// nullability only. Enums take their first declared member as default.
#[derive(Debug, Clone)]
pub struct ParameterMapper {
    item_name: String,
}

impl ParameterMapper {
    pub fn new() -> Self {
        Self {
            item_name: DEFAULT_ITEM_NAME.to_string(),
        }
    }

    pub fn with_item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = name.into();
        self
    }

    pub fn map(&self, name: &str, descriptor: &TypeDescriptor) -> Result<Parameter, SchemaError> {
        self.map_node(name, name, descriptor, descriptor.description.as_deref())
    }

    /// Maps a class descriptor to the parameter list of its properties.
    pub fn map_fields(&self, descriptor: &TypeDescriptor) -> Result<Vec<Parameter>, SchemaError> {
        match &descriptor.kind {
            TypeKind::Class(fields) => self.map_class_fields(&descriptor.name, fields),
            other => Err(SchemaError::unsupported(
                descriptor.name.clone(),
                format!("expected a class, found {}", kind_label(other)),
            )),
        }
    }

    fn map_node(
        &self,
        name: &str,
        path: &str,
        descriptor: &TypeDescriptor,
        description: Option<&str>,
    ) -> Result<Parameter, SchemaError> {
        let parameter = match &descriptor.kind {
            TypeKind::Primitive(kind) => Parameter::primitive(name, primitive_type(*kind)),
            TypeKind::Enum(values) => {
                if values.is_empty() {
                    return Err(SchemaError::unsupported(path, "enum declares no members"));
                }
                let values: Vec<PrimitiveValue> = values
                    .iter()
                    .map(|v| PrimitiveValue::String(v.clone()))
                    .collect();
                Parameter::Enum {
                    name: name.to_string(),
                    description: None,
                    is_required: true,
                    default: values.first().cloned(),
                    values,
                    value_type: PrimitiveType::String,
                }
            }
            TypeKind::List(item) => {
                let item_path = format!("{}[]", path);
                let item_parameter = self.map_node(
                    &self.item_name,
                    &item_path,
                    item,
                    item.description.as_deref(),
                )?;
                Parameter::array(name, item_parameter)
            }
            TypeKind::Class(fields) => {
                Parameter::object(name, self.map_class_fields(path, fields)?)
            }
            TypeKind::Unsupported(reason) => {
                return Err(SchemaError::unsupported(path, reason.clone()));
            }
        };

        let parameter = parameter.with_required(!descriptor.nullable);
        Ok(match description {
            Some(text) => parameter.with_description(text),
            None => parameter,
        })
    }

    fn map_class_fields(
        &self,
        path: &str,
        fields: &[FieldDescriptor],
    ) -> Result<Vec<Parameter>, SchemaError> {
        fields
            .iter()
            .map(|field| {
                let field_path = format!("{}.{}", path, field.name);
                let description = field
                    .description
                    .as_deref()
                    .or(field.descriptor.description.as_deref());
                self.map_node(&field.name, &field_path, &field.descriptor, description)
            })
            .collect()
    }
}

impl Default for ParameterMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn primitive_type(kind: PrimitiveKind) -> PrimitiveType {
    match kind {
        PrimitiveKind::String | PrimitiveKind::Char => PrimitiveType::String,
        PrimitiveKind::Int | PrimitiveKind::Long | PrimitiveKind::Short | PrimitiveKind::Byte => {
            PrimitiveType::Integer
        }
        PrimitiveKind::Float | PrimitiveKind::Double => PrimitiveType::Number,
        PrimitiveKind::Boolean => PrimitiveType::Boolean,
    }
}

fn kind_label(kind: &TypeKind) -> &'static str {
    match kind {
        TypeKind::Primitive(_) => "primitive",
        TypeKind::Enum(_) => "enum",
        TypeKind::List(_) => "list",
        TypeKind::Class(_) => "class",
        TypeKind::Unsupported(_) => "unsupported type",
    }
}
