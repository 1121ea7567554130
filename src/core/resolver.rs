//! core::resolver
//!
//! Resolution of qualified names and type references.
//!
//! # Prefix Lookup
//!
//! A qualified name `<prefix>.<local>` is resolved by looking `<prefix>` up
//! first as a full namespace name, then as an alias. Both paths yield the
//! same shared [`Namespace`], so `NW.Customer` and `NorthwindModel.Customer`
//! resolve identically.
//!
//! # Type References
//!
//! With a [`SchemaCatalog`] attached, type references resolve further into
//! primitive, entity, or complex types. `Edm` (plus any configured alias
//! of it) addresses the primitive types.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use odata_edm::core::namespace::NamespaceBuilder;
//! use odata_edm::core::registry::NamespaceRegistry;
//! use odata_edm::core::resolver::TypeResolver;
//!
//! let mut registry = NamespaceRegistry::new();
//! registry
//!     .register(NamespaceBuilder::new("NorthwindModel").unwrap().with_alias("NW"))
//!     .unwrap();
//!
//! let resolver = TypeResolver::new(&registry);
//! let short = resolver.resolve_str("NW.Customer").unwrap();
//! let long = resolver.resolve_str("NorthwindModel.Customer").unwrap();
//! assert!(Arc::ptr_eq(&short.namespace, &long.namespace));
//! assert_eq!(short.canonical().to_string(), "NorthwindModel.Customer");
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::core::model::SchemaCatalog;
use crate::core::named::Named;
use crate::core::namespace::Namespace;
use crate::core::primitive::{EdmPrimitive, PRIMITIVE_NAMESPACE};
use crate::core::registry::NamespaceRegistry;
use crate::core::schema::{Association, ComplexType, EntityType, TypeReference};
use crate::core::types::{QualifiedName, TypeError};

/// Errors from name and type resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Malformed(#[from] TypeError),

    #[error("'{reference}' uses prefix '{prefix}', which is neither a namespace nor an alias")]
    UnresolvedPrefix { prefix: String, reference: String },

    #[error("unknown primitive type '{0}'")]
    UnknownPrimitive(String),

    #[error("type '{0}' is not declared")]
    UnresolvedType(String),

    #[error("'{0}' is not an entity type")]
    NotAnEntityType(String),

    #[error("association '{0}' is not declared")]
    UnresolvedAssociation(String),
}

/// A qualified name bound to its declaring namespace.
#[derive(Debug, Clone)]
pub struct ResolvedName {
    /// The namespace the prefix resolved to.
    pub namespace: Arc<Namespace>,
    /// The unqualified name.
    pub local_name: String,
}

impl ResolvedName {
    /// The name rewritten with the full namespace name as prefix.
    pub fn canonical(&self) -> QualifiedName {
        QualifiedName::from_raw(self.namespace.name(), &self.local_name)
    }
}

impl PartialEq for ResolvedName {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.namespace, &other.namespace) && self.local_name == other.local_name
    }
}

impl Eq for ResolvedName {}

/// A resolved type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Primitive,
    Entity,
    Complex,
}

/// A type reference resolved against a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef<'a> {
    Primitive(EdmPrimitive),
    Entity(&'a EntityType),
    Complex(&'a ComplexType),
    Collection(Box<TypeRef<'a>>),
}

impl TypeRef<'_> {
    /// The kind of the innermost element type.
    pub fn element_kind(&self) -> TypeKind {
        match self {
            Self::Primitive(_) => TypeKind::Primitive,
            Self::Entity(_) => TypeKind::Entity,
            Self::Complex(_) => TypeKind::Complex,
            Self::Collection(inner) => inner.element_kind(),
        }
    }
}

/// Resolves names against a registry and, optionally, a catalog.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    registry: &'a NamespaceRegistry,
    catalog: Option<&'a SchemaCatalog>,
    primitive_aliases: &'a [String],
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver over a registry, without a catalog.
    pub fn new(registry: &'a NamespaceRegistry) -> Self {
        Self {
            registry,
            catalog: None,
            primitive_aliases: &[],
        }
    }

    /// Attach a catalog of declared types.
    pub fn with_catalog(mut self, catalog: &'a SchemaCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Treat extra prefixes like `Edm`.
    pub fn with_primitive_aliases(mut self, aliases: &'a [String]) -> Self {
        self.primitive_aliases = aliases;
        self
    }

    /// Resolve a prefix: namespace name first, then alias.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnresolvedPrefix` if neither matches.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<&'a Arc<Namespace>, ResolveError> {
        self.registry
            .lookup(prefix)
            .ok_or_else(|| ResolveError::UnresolvedPrefix {
                prefix: prefix.to_string(),
                reference: prefix.to_string(),
            })
    }

    /// Bind a qualified name to its namespace.
    pub fn resolve(&self, name: &QualifiedName) -> Result<ResolvedName, ResolveError> {
        let namespace = self
            .registry
            .lookup(name.prefix())
            .ok_or_else(|| ResolveError::UnresolvedPrefix {
                prefix: name.prefix().to_string(),
                reference: name.to_string(),
            })?;

        Ok(ResolvedName {
            namespace: Arc::clone(namespace),
            local_name: name.local_name().to_string(),
        })
    }

    /// Parse and bind a qualified name.
    pub fn resolve_str(&self, text: &str) -> Result<ResolvedName, ResolveError> {
        self.resolve(&QualifiedName::parse(text)?)
    }

    /// Rewrite a qualified name to use the full namespace name.
    pub fn canonicalize(&self, name: &QualifiedName) -> Result<QualifiedName, ResolveError> {
        Ok(self.resolve(name)?.canonical())
    }

    /// Whether `prefix` addresses the primitive types.
    ///
    /// A registered namespace name or alias always takes precedence, so a
    /// prefix resolves the same way whichever form a reference uses.
    pub fn is_primitive_prefix(&self, prefix: &str) -> bool {
        if self.registry.contains(prefix) {
            return false;
        }
        prefix == PRIMITIVE_NAMESPACE || self.primitive_aliases.iter().any(|a| a == prefix)
    }

    /// Resolve a type reference to a primitive, entity, or complex type.
    ///
    /// # Errors
    ///
    /// Returns a `ResolveError` if the prefix is unknown, the primitive does
    /// not exist, or no entity/complex type has that name.
    pub fn resolve_type(&self, reference: &TypeReference) -> Result<TypeRef<'a>, ResolveError> {
        match reference {
            TypeReference::Collection(inner) => {
                Ok(TypeRef::Collection(Box::new(self.resolve_type(inner)?)))
            }
            TypeReference::Named(name) => self.resolve_named_type(name),
        }
    }

    fn resolve_named_type(&self, name: &QualifiedName) -> Result<TypeRef<'a>, ResolveError> {
        if self.is_primitive_prefix(name.prefix()) {
            return EdmPrimitive::from_local_name(name.local_name())
                .map(TypeRef::Primitive)
                .ok_or_else(|| ResolveError::UnknownPrimitive(name.to_string()));
        }

        let key = self.canonicalize(name)?.to_string();
        let catalog = self.catalog;

        if let Some(entity) = catalog.and_then(|c| c.entity_types.get(&key)) {
            return Ok(TypeRef::Entity(entity));
        }
        if let Some(complex) = catalog.and_then(|c| c.complex_types.get(&key)) {
            return Ok(TypeRef::Complex(complex));
        }
        Err(ResolveError::UnresolvedType(name.to_string()))
    }

    /// Resolve a qualified name that must denote an entity type.
    pub fn resolve_entity_type(
        &self,
        name: &QualifiedName,
    ) -> Result<&'a EntityType, ResolveError> {
        match self.resolve_named_type(name)? {
            TypeRef::Entity(entity) => Ok(entity),
            _ => Err(ResolveError::NotAnEntityType(name.to_string())),
        }
    }

    /// Resolve a qualified name that must denote an association.
    pub fn resolve_association(
        &self,
        name: &QualifiedName,
    ) -> Result<&'a Association, ResolveError> {
        let key = self.canonicalize(name)?.to_string();
        self.catalog
            .and_then(|c| c.associations.get(&key))
            .ok_or_else(|| ResolveError::UnresolvedAssociation(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::namespace::NamespaceBuilder;

    fn northwind() -> NamespaceRegistry {
        let mut registry = NamespaceRegistry::new();
        registry
            .register(NamespaceBuilder::new("NorthwindModel").unwrap().with_alias("NW"))
            .unwrap();
        registry
            .register(NamespaceBuilder::new("ODataDemo").unwrap())
            .unwrap();
        registry
    }

    #[test]
    fn alias_and_name_resolve_equally() {
        let registry = northwind();
        let resolver = TypeResolver::new(&registry);

        let a = resolver.resolve_str("NW.Customer").unwrap();
        let b = resolver.resolve_str("NorthwindModel.Customer").unwrap();
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.namespace, &b.namespace));
    }

    #[test]
    fn canonicalize_expands_alias() {
        let registry = northwind();
        let resolver = TypeResolver::new(&registry);
        let qn = QualifiedName::parse("NW.Order").unwrap();
        assert_eq!(
            resolver.canonicalize(&qn).unwrap().to_string(),
            "NorthwindModel.Order"
        );
    }

    #[test]
    fn unknown_prefix_reported() {
        let registry = northwind();
        let resolver = TypeResolver::new(&registry);
        assert_eq!(
            resolver.resolve_str("Foo.Customer").unwrap_err(),
            ResolveError::UnresolvedPrefix {
                prefix: "Foo".into(),
                reference: "Foo.Customer".into(),
            }
        );
    }

    #[test]
    fn malformed_reference_reported() {
        let registry = northwind();
        let resolver = TypeResolver::new(&registry);
        assert!(matches!(
            resolver.resolve_str("Customer"),
            Err(ResolveError::Malformed(_))
        ));
    }

    #[test]
    fn resolve_prefix_by_alias() {
        let registry = northwind();
        let resolver = TypeResolver::new(&registry);
        assert_eq!(resolver.resolve_prefix("NW").unwrap().name(), "NorthwindModel");
        assert!(resolver.resolve_prefix("Edm").is_err());
    }

    #[test]
    fn primitives_resolve_without_catalog() {
        let registry = northwind();
        let resolver = TypeResolver::new(&registry);
        let r = TypeReference::parse("Collection(Edm.Int32)").unwrap();
        assert_eq!(
            resolver.resolve_type(&r).unwrap(),
            TypeRef::Collection(Box::new(TypeRef::Primitive(EdmPrimitive::Int32)))
        );
    }

    #[test]
    fn unknown_primitive() {
        let registry = northwind();
        let resolver = TypeResolver::new(&registry);
        let r = TypeReference::parse("Edm.Int128").unwrap();
        assert_eq!(
            resolver.resolve_type(&r).unwrap_err(),
            ResolveError::UnknownPrimitive("Edm.Int128".into())
        );
    }

    #[test]
    fn primitive_alias() {
        let registry = northwind();
        let aliases = vec!["edm".to_string()];
        let resolver = TypeResolver::new(&registry).with_primitive_aliases(&aliases);
        let r = TypeReference::parse("edm.String").unwrap();
        assert_eq!(
            resolver.resolve_type(&r).unwrap(),
            TypeRef::Primitive(EdmPrimitive::String)
        );
    }

    #[test]
    fn declared_alias_wins_over_primitive_alias() {
        let registry = northwind();
        let aliases = vec!["NW".to_string()];
        let resolver = TypeResolver::new(&registry).with_primitive_aliases(&aliases);

        assert!(!resolver.is_primitive_prefix("NW"));
        assert!(resolver.is_primitive_prefix("Edm"));

        let by_alias = TypeReference::parse("NW.Customer").unwrap();
        let by_name = TypeReference::parse("NorthwindModel.Customer").unwrap();
        assert_eq!(
            resolver.resolve_type(&by_alias).unwrap_err(),
            ResolveError::UnresolvedType("NW.Customer".into())
        );
        assert_eq!(
            resolver.resolve_type(&by_name).unwrap_err(),
            ResolveError::UnresolvedType("NorthwindModel.Customer".into())
        );
    }

    #[test]
    fn undeclared_type_without_catalog() {
        let registry = northwind();
        let resolver = TypeResolver::new(&registry);
        let r = TypeReference::parse("NW.Address").unwrap();
        assert_eq!(
            resolver.resolve_type(&r).unwrap_err(),
            ResolveError::UnresolvedType("NW.Address".into())
        );
    }
}
