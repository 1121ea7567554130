//! core::named
//!
//! The identity capability shared by every named schema entity.
//!
//! Namespaces, entity types, complex types and associations all carry a
//! [`SchemaName`] and expose it through [`Named`], so registries and
//! lookups can be written once over "named things".

use serde::{Deserialize, Serialize};

use crate::core::types::{SchemaName, TypeError};

/// A schema entity with a stable identifying name.
pub trait Named {
    /// The entity's name.
    fn schema_name(&self) -> &SchemaName;

    /// The entity's name as a string slice.
    fn name(&self) -> &str {
        self.schema_name().as_str()
    }
}

/// The smallest named schema entity: a name and nothing else.
///
/// The name is fixed at construction; there is no rename.
///
/// # Example
///
/// ```
/// use odata_edm::core::named::{Named, NamedObject};
///
/// let obj = NamedObject::new("Customer").unwrap();
/// assert_eq!(obj.name(), "Customer");
/// assert!(NamedObject::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedObject {
    name: SchemaName,
}

impl NamedObject {
    /// Create a named object.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MissingName` if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        Ok(Self {
            name: SchemaName::new(name)?,
        })
    }
}

impl From<SchemaName> for NamedObject {
    fn from(name: SchemaName) -> Self {
        Self { name }
    }
}

impl Named for NamedObject {
    fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

impl Named for SchemaName {
    fn schema_name(&self) -> &SchemaName {
        self
    }
}
