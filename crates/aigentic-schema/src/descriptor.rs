//! Language-neutral description of a structured type

/// Declared kind of a primitive field, before collapsing into a `PrimitiveType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Int,
    Long,
    Short,
    Byte,
    Float,
    Double,
    Boolean,
    Char,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// Member names in declaration order.
    Enum(Vec<String>),
    List(Box<TypeDescriptor>),
    /// Properties in declaration order.
    Class(Vec<FieldDescriptor>),
    /// Shapes with no parameter equivalent (maps, unions, open polymorphism).
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    pub kind: TypeKind,
    pub nullable: bool,
    pub description: Option<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            description: None,
        }
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(format!("{:?}", kind), TypeKind::Primitive(kind))
    }

    pub fn string() -> Self {
        Self::primitive(PrimitiveKind::String)
    }

    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            TypeKind::Enum(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn list(item: TypeDescriptor) -> Self {
        Self::new("List", TypeKind::List(Box::new(item)))
    }

    pub fn class(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Class(fields))
    }

    pub fn unsupported(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Unsupported(reason.into()))
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub description: Option<String>,
    /// Recorded for completeness; it never relaxes required-ness.
    pub has_default: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
            description: None,
            has_default: false,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}
