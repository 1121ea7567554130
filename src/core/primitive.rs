//! core::primitive
//!
//! EDM primitive types, addressed as `Edm.<Name>`.

use serde::{Deserialize, Serialize};

/// The namespace that holds the primitive types.
pub const PRIMITIVE_NAMESPACE: &str = "Edm";

/// An EDM primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdmPrimitive {
    Binary,
    Boolean,
    Byte,
    DateTime,
    DateTimeOffset,
    Time,
    Decimal,
    Double,
    Single,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    String,
    Stream,
}

impl EdmPrimitive {
    /// All primitive types.
    pub const ALL: [EdmPrimitive; 16] = [
        Self::Binary,
        Self::Boolean,
        Self::Byte,
        Self::DateTime,
        Self::DateTimeOffset,
        Self::Time,
        Self::Decimal,
        Self::Double,
        Self::Single,
        Self::Guid,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::SByte,
        Self::String,
        Self::Stream,
    ];

    /// Look up a primitive by its local name (`"Int32"`).
    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.local_name() == name)
    }

    /// The local name, without the `Edm.` prefix.
    pub fn local_name(self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::Time => "Time",
            Self::Decimal => "Decimal",
            Self::Double => "Double",
            Self::Single => "Single",
            Self::Guid => "Guid",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::SByte => "SByte",
            Self::String => "String",
            Self::Stream => "Stream",
        }
    }
}

impl std::fmt::Display for EdmPrimitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", PRIMITIVE_NAMESPACE, self.local_name())
    }
}
