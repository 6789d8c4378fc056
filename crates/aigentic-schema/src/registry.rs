use parking_lot::RwLock;
use schemars::JsonSchema;
use std::collections::HashMap;
use std::fmt;

use aigentic_core::{Parameter, SchemaError};

use crate::json_schema::describe;
use crate::mapper::ParameterMapper;

/// Identity of a registered type: module path plus simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentity {
    pub package: String,
    pub simple_name: String,
}

impl TypeIdentity {
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_name: simple_name.into(),
        }
    }

    /// Derives the identity from the Rust type path, ignoring generic arguments.
    pub fn of<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let base = full.split('<').next().unwrap_or(full);
        match base.rsplit_once("::") {
            Some((package, simple_name)) => Self::new(package, simple_name),
            None => Self::new("", base),
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.simple_name)
        } else {
            write!(f, "{}::{}", self.package, self.simple_name)
        }
    }
}

/// Lookup of previously mapped parameters by type identity.
///
/// Registration overwrites any earlier entry for the same identity.
pub struct ParameterRegistry {
    entries: RwLock<HashMap<TypeIdentity, Parameter>>,
    mapper: ParameterMapper,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            mapper: ParameterMapper::new(),
        }
    }

    pub fn with_mapper(mapper: ParameterMapper) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            mapper,
        }
    }

    pub fn register(&self, identity: TypeIdentity, parameter: Parameter) {
        tracing::debug!(identity = %identity, "registering parameter");
        self.entries.write().insert(identity, parameter);
    }

    /// Maps `T` and stores the result under its type identity.
    pub fn register_type<T: JsonSchema>(&self) -> Result<Parameter, SchemaError> {
        let identity = TypeIdentity::of::<T>();
        let descriptor = describe::<T>()?;
        let parameter = self.mapper.map(&identity.simple_name, &descriptor)?;
        self.register(identity, parameter.clone());
        Ok(parameter)
    }

    pub fn lookup(&self, identity: &TypeIdentity) -> Option<Parameter> {
        self.entries.read().get(identity).cloned()
    }

    pub fn lookup_type<T: ?Sized>(&self) -> Option<Parameter> {
        self.lookup(&TypeIdentity::of::<T>())
    }

    /// Returns the registered parameter for `T`, mapping and registering it on first use.
    pub fn get_or_register<T: JsonSchema>(&self) -> Result<Parameter, SchemaError> {
        match self.lookup_type::<T>() {
            Some(parameter) => Ok(parameter),
            None => self.register_type::<T>(),
        }
    }

    pub fn identities(&self) -> Vec<TypeIdentity> {
        let mut identities: Vec<_> = self.entries.read().keys().cloned().collect();
        identities.sort();
        identities
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ParameterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Forecast {
        city: String,
        days: u8,
    }

    #[test]
    fn test_type_identity_splits_path() {
        let identity = TypeIdentity::of::<Forecast>();
        assert_eq!(identity.simple_name, "Forecast");
        assert!(identity.package.ends_with("registry::tests"));

        let generic = TypeIdentity::of::<Vec<String>>();
        assert_eq!(generic.simple_name, "Vec");
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let registry = ParameterRegistry::new();
        assert!(registry.lookup(&TypeIdentity::new("pkg", "Missing")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_type_then_lookup() {
        let registry = ParameterRegistry::new();
        let parameter = registry.register_type::<Forecast>().unwrap();
        assert_eq!(
            parameter,
            Parameter::object(
                "Forecast",
                vec![Parameter::string("city"), Parameter::integer("days")]
            )
        );
        assert_eq!(registry.lookup_type::<Forecast>(), Some(parameter));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ParameterRegistry::new();
        let identity = TypeIdentity::new("pkg", "Thing");
        registry.register(identity.clone(), Parameter::string("first"));
        registry.register(identity.clone(), Parameter::string("second"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&identity), Some(Parameter::string("second")));
    }
}
