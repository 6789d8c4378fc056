//! Type to parameter schema mapping for the Aigentic agent framework

mod descriptor;
mod json_schema;
mod mapper;
mod registry;

pub use descriptor::{FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};
pub use json_schema::{describe, descriptor_from_schema};
pub use mapper::ParameterMapper;
pub use registry::{ParameterRegistry, TypeIdentity};

use aigentic_core::{Parameter, SchemaError};
use schemars::JsonSchema;

/// Maps `T` to a single parameter called `name`.
pub fn parameter_for<T: JsonSchema>(name: &str) -> Result<Parameter, SchemaError> {
    ParameterMapper::new().map(name, &describe::<T>()?)
}

/// Maps the properties of struct `T` to a tool parameter list.
pub fn parameters_for<T: JsonSchema>() -> Result<Vec<Parameter>, SchemaError> {
    ParameterMapper::new().map_fields(&describe::<T>()?)
}
