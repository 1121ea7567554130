//! core::schema
//!
//! Named schema objects declared inside a namespace.
//!
//! # Types
//!
//! - [`EntityType`] - Keyed type with structural and navigation properties
//! - [`ComplexType`] - Keyless structured type
//! - [`Association`] - Relationship between two entity types
//! - [`TypeReference`] - Property/end type: a qualified name or a collection
//!
//! Every object refers to its declaring namespace by name (or alias) only;
//! the namespace itself lives in the model's registry.
//!
//! # Example
//!
//! ```
//! use odata_edm::core::named::Named;
//! use odata_edm::core::schema::{Declared, EntityType, Property};
//!
//! let customer = EntityType::new("NW", "Customer")
//!     .unwrap()
//!     .with_property(Property::new("CustomerID", "Edm.String").unwrap().nullable(false))
//!     .with_key("CustomerID")
//!     .unwrap();
//!
//! assert_eq!(customer.name(), "Customer");
//! assert_eq!(customer.qualified_name().to_string(), "NW.Customer");
//! ```

use serde::{Deserialize, Serialize};

use crate::core::named::Named;
use crate::core::types::{QualifiedName, SchemaName, TypeError};

/// A schema object that belongs to a namespace.
pub trait Declared: Named {
    /// The declaring namespace (name or alias as written).
    fn namespace(&self) -> &SchemaName;

    /// `<namespace>.<name>`.
    fn qualified_name(&self) -> QualifiedName {
        QualifiedName::from_parts(self.namespace(), self.schema_name())
    }
}

/// The type of a property or association end.
///
/// Written either as a qualified name (`Edm.String`, `NW.Address`) or as
/// `Collection(<type>)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeReference {
    Named(QualifiedName),
    Collection(Box<TypeReference>),
}

impl TypeReference {
    /// Parse a type reference.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MalformedQualifiedName` if the innermost name is
    /// not qualified.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        match text
            .strip_prefix("Collection(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => Ok(Self::Collection(Box::new(Self::parse(inner)?))),
            None => Ok(Self::Named(QualifiedName::parse(text)?)),
        }
    }

    /// The innermost qualified name.
    pub fn element(&self) -> &QualifiedName {
        match self {
            Self::Named(name) => name,
            Self::Collection(inner) => inner.element(),
        }
    }

    /// Whether this is a collection type.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

impl TryFrom<String> for TypeReference {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TypeReference> for String {
    fn from(r: TypeReference) -> Self {
        r.to_string()
    }
}

impl std::fmt::Display for TypeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Collection(inner) => write!(f, "Collection({inner})"),
        }
    }
}

/// A structural property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Property {
    name: SchemaName,
    #[serde(rename = "type")]
    type_ref: TypeReference,
    #[serde(default = "default_nullable")]
    nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Property {
    /// Create a nullable property.
    pub fn new(name: impl Into<String>, type_ref: &str) -> Result<Self, TypeError> {
        Ok(Self {
            name: SchemaName::new(name)?,
            type_ref: TypeReference::parse(type_ref)?,
            nullable: true,
        })
    }

    /// Set nullability.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// The property's type.
    pub fn type_ref(&self) -> &TypeReference {
        &self.type_ref
    }

    /// Whether the property accepts null.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl Named for Property {
    fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

/// A navigation property following one side of an association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavigationProperty {
    name: SchemaName,
    relationship: QualifiedName,
    from_role: SchemaName,
    to_role: SchemaName,
}

impl NavigationProperty {
    /// Create a navigation property over `relationship` from one role to another.
    pub fn new(
        name: impl Into<String>,
        relationship: &str,
        from_role: impl Into<String>,
        to_role: impl Into<String>,
    ) -> Result<Self, TypeError> {
        Ok(Self {
            name: SchemaName::new(name)?,
            relationship: QualifiedName::parse(relationship)?,
            from_role: SchemaName::new(from_role)?,
            to_role: SchemaName::new(to_role)?,
        })
    }

    /// The association this property navigates.
    pub fn relationship(&self) -> &QualifiedName {
        &self.relationship
    }

    /// The association role this property starts from.
    pub fn from_role(&self) -> &SchemaName {
        &self.from_role
    }

    /// The association role this property leads to.
    pub fn to_role(&self) -> &SchemaName {
        &self.to_role
    }
}

impl Named for NavigationProperty {
    fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

/// An entity type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityType {
    namespace: SchemaName,
    name: SchemaName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_type: Option<QualifiedName>,
    #[serde(default)]
    is_abstract: bool,
    #[serde(default)]
    keys: Vec<SchemaName>,
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    navigation_properties: Vec<NavigationProperty>,
}

impl EntityType {
    /// Declare an entity type in `namespace` (full name or alias).
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self, TypeError> {
        Ok(Self {
            namespace: SchemaName::new(namespace)?,
            name: SchemaName::new(name)?,
            base_type: None,
            is_abstract: false,
            keys: Vec::new(),
            properties: Vec::new(),
            navigation_properties: Vec::new(),
        })
    }

    /// Derive from another entity type.
    pub fn with_base_type(mut self, base_type: &str) -> Result<Self, TypeError> {
        self.base_type = Some(QualifiedName::parse(base_type)?);
        Ok(self)
    }

    /// Mark the type abstract.
    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Add a key property reference.
    pub fn with_key(mut self, property: impl Into<String>) -> Result<Self, TypeError> {
        self.keys.push(SchemaName::new(property)?);
        Ok(self)
    }

    /// Add a structural property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a navigation property.
    pub fn with_navigation(mut self, navigation: NavigationProperty) -> Self {
        self.navigation_properties.push(navigation);
        self
    }

    /// The type this entity type derives from, as written.
    pub fn base_type(&self) -> Option<&QualifiedName> {
        self.base_type.as_ref()
    }

    /// Whether the type is abstract.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Key property names in declaration order. May be empty for derived
    /// types, which inherit their key.
    pub fn keys(&self) -> &[SchemaName] {
        &self.keys
    }

    /// Structural properties in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Navigation properties in declaration order.
    pub fn navigation_properties(&self) -> &[NavigationProperty] {
        &self.navigation_properties
    }

    /// Find a structural property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub(crate) fn set_namespace(&mut self, namespace: SchemaName) {
        self.namespace = namespace;
    }
}

impl Named for EntityType {
    fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

impl Declared for EntityType {
    fn namespace(&self) -> &SchemaName {
        &self.namespace
    }
}

/// A complex type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplexType {
    namespace: SchemaName,
    name: SchemaName,
    #[serde(default)]
    properties: Vec<Property>,
}

impl ComplexType {
    /// Declare a complex type in `namespace` (full name or alias).
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self, TypeError> {
        Ok(Self {
            namespace: SchemaName::new(namespace)?,
            name: SchemaName::new(name)?,
            properties: Vec::new(),
        })
    }

    /// Add a structural property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Structural properties in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub(crate) fn set_namespace(&mut self, namespace: SchemaName) {
        self.namespace = namespace;
    }
}

impl Named for ComplexType {
    fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

impl Declared for ComplexType {
    fn namespace(&self) -> &SchemaName {
        &self.namespace
    }
}

/// How many entities may sit at one end of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    #[serde(rename = "0..1")]
    ZeroOrOne,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "*")]
    Many,
}

impl std::str::FromStr for Multiplicity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0..1" => Ok(Self::ZeroOrOne),
            "1" => Ok(Self::One),
            "*" => Ok(Self::Many),
            other => Err(format!("invalid multiplicity '{other}'")),
        }
    }
}

impl std::fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ZeroOrOne => "0..1",
            Self::One => "1",
            Self::Many => "*",
        };
        f.write_str(s)
    }
}

/// One side of an association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssociationEnd {
    role: SchemaName,
    #[serde(rename = "type")]
    type_ref: QualifiedName,
    multiplicity: Multiplicity,
}

impl AssociationEnd {
    /// Create an end for `role`, pointing at the entity type `type_ref`.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the role is empty or `type_ref` is not a
    /// qualified name.
    pub fn new(
        role: impl Into<String>,
        type_ref: &str,
        multiplicity: Multiplicity,
    ) -> Result<Self, TypeError> {
        Ok(Self {
            role: SchemaName::new(role)?,
            type_ref: QualifiedName::parse(type_ref)?,
            multiplicity,
        })
    }

    /// The role name, unique within the association.
    pub fn role(&self) -> &SchemaName {
        &self.role
    }

    /// The entity type at this end.
    pub fn type_ref(&self) -> &QualifiedName {
        &self.type_ref
    }

    /// How many instances may sit at this end.
    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }
}

/// An association between two entity types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Association {
    namespace: SchemaName,
    name: SchemaName,
    ends: [AssociationEnd; 2],
}

impl Association {
    /// Declare an association in `namespace` (full name or alias).
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        ends: [AssociationEnd; 2],
    ) -> Result<Self, TypeError> {
        Ok(Self {
            namespace: SchemaName::new(namespace)?,
            name: SchemaName::new(name)?,
            ends,
        })
    }

    /// Both ends, in declaration order.
    pub fn ends(&self) -> &[AssociationEnd; 2] {
        &self.ends
    }

    /// Find an end by role name.
    pub fn end(&self, role: &str) -> Option<&AssociationEnd> {
        self.ends.iter().find(|e| e.role.as_str() == role)
    }

    pub(crate) fn set_namespace(&mut self, namespace: SchemaName) {
        self.namespace = namespace;
    }
}

impl Named for Association {
    fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

impl Declared for Association {
    fn namespace(&self) -> &SchemaName {
        &self.namespace
    }
}
