//! core::model
//!
//! The metadata-document model and its builder.
//!
//! # Build Phase
//!
//! A document reader drives a [`ModelBuilder`]: it declares each namespace
//! (alias included) and adds the entity types, complex types and
//! associations found inside. Declarations may name their namespace by
//! full name or by alias.
//!
//! # Validation
//!
//! [`ModelBuilder::build`] checks every cross-reference before publishing:
//! - Each declaration's namespace is registered
//! - Type names are unique within a namespace
//! - Keys and property names are consistent
//! - Property, base and association-end types resolve
//! - Navigation properties name a declared association and its roles
//! - Inheritance chains are acyclic
//!
//! The first failure aborts the whole load; there is no partially resolved
//! model.
//!
//! # Example
//!
//! ```
//! use odata_edm::core::model::ModelBuilder;
//! use odata_edm::core::namespace::NamespaceBuilder;
//! use odata_edm::core::schema::{EntityType, Property};
//!
//! let mut builder = ModelBuilder::new();
//! builder
//!     .declare_namespace(NamespaceBuilder::new("NorthwindModel").unwrap().with_alias("NW"))
//!     .unwrap();
//! builder.add_entity_type(
//!     EntityType::new("NW", "Customer")
//!         .unwrap()
//!         .with_property(Property::new("CustomerID", "Edm.String").unwrap().nullable(false))
//!         .with_key("CustomerID")
//!         .unwrap(),
//! );
//!
//! let model = builder.build().unwrap();
//! let by_alias = model.entity_type("NW.Customer").unwrap();
//! let by_name = model.entity_type("NorthwindModel.Customer").unwrap();
//! assert!(std::ptr::eq(by_alias, by_name));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::config::Config;
use crate::core::named::Named;
use crate::core::namespace::{Namespace, NamespaceBuilder};
use crate::core::registry::{NamespaceRegistry, RegistryError, RegistryPolicy};
use crate::core::resolver::{ResolveError, TypeKind, TypeResolver};
use crate::core::schema::{Association, ComplexType, Declared, EntityType, Property};
use crate::core::types::{Fingerprint, QualifiedName, SchemaName, TypeError};

/// Errors from building a metadata model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("{context}: {source}")]
    Unresolved {
        context: String,
        #[source]
        source: ResolveError,
    },

    #[error("'{0}' is declared more than once")]
    DuplicateDeclaration(String),

    #[error("'{owner}' declares property '{property}' more than once")]
    DuplicateProperty { owner: String, property: String },

    #[error("entity type '{0}' declares no key and has no base type")]
    MissingKey(String),

    #[error("key '{key}' of entity type '{entity}' is not one of its properties")]
    KeyNotFound { entity: String, key: String },

    #[error("property '{property}' of '{owner}' has type '{type_ref}', which is not a primitive or complex type")]
    InvalidPropertyType {
        owner: String,
        property: String,
        type_ref: String,
    },

    #[error("navigation property '{navigation}' of '{owner}' uses role '{role}', which association '{association}' does not define")]
    UnknownRole {
        owner: String,
        navigation: String,
        role: String,
        association: String,
    },

    #[error("entity type '{0}' inherits from itself")]
    InheritanceCycle(String),
}

impl ModelError {
    fn unresolved(context: impl Into<String>, source: ResolveError) -> Self {
        Self::Unresolved {
            context: context.into(),
            source,
        }
    }
}

/// Declared schema objects, keyed by canonical qualified name.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    pub(crate) entity_types: BTreeMap<String, EntityType>,
    pub(crate) complex_types: BTreeMap<String, ComplexType>,
    pub(crate) associations: BTreeMap<String, Association>,
}

impl SchemaCatalog {
    /// Total number of declarations.
    pub fn len(&self) -> usize {
        self.entity_types.len() + self.complex_types.len() + self.associations.len()
    }

    /// Whether nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &str) -> bool {
        self.entity_types.contains_key(key)
            || self.complex_types.contains_key(key)
            || self.associations.contains_key(key)
    }
}

/// Collects namespaces and schema objects for one metadata document.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    registry: NamespaceRegistry,
    primitive_aliases: Vec<String>,
    entity_types: Vec<EntityType>,
    complex_types: Vec<ComplexType>,
    associations: Vec<Association>,
}

impl ModelBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder whose registry and resolver follow `config`.
    pub fn with_config(config: &Config) -> Self {
        Self {
            registry: NamespaceRegistry::with_policy(RegistryPolicy::from_config(config)),
            primitive_aliases: config.primitive_namespace_aliases().to_vec(),
            ..Self::default()
        }
    }

    /// Publish a namespace declaration.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Registry` if the name or alias conflicts with an
    /// earlier declaration.
    pub fn declare_namespace(
        &mut self,
        namespace: NamespaceBuilder,
    ) -> Result<Arc<Namespace>, ModelError> {
        Ok(self.registry.register(namespace)?)
    }

    /// Queue an entity type; it is checked by [`ModelBuilder::build`].
    pub fn add_entity_type(&mut self, entity: EntityType) -> &mut Self {
        self.entity_types.push(entity);
        self
    }

    /// Queue a complex type; it is checked by [`ModelBuilder::build`].
    pub fn add_complex_type(&mut self, complex: ComplexType) -> &mut Self {
        self.complex_types.push(complex);
        self
    }

    /// Queue an association; it is checked by [`ModelBuilder::build`].
    pub fn add_association(&mut self, association: Association) -> &mut Self {
        self.associations.push(association);
        self
    }

    /// The namespaces declared so far.
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// Validate every declaration and publish the model.
    ///
    /// # Errors
    ///
    /// Returns the first `ModelError` found; nothing is published on error.
    pub fn build(self) -> Result<MetadataModel, ModelError> {
        let ModelBuilder {
            registry,
            primitive_aliases,
            entity_types,
            complex_types,
            associations,
        } = self;

        let mut catalog = SchemaCatalog::default();
        {
            let resolver = TypeResolver::new(&registry);

            for mut entity in entity_types {
                let key = canonical_home(&resolver, &mut entity, EntityType::set_namespace)?;
                check_unique(&catalog, &key)?;
                catalog.entity_types.insert(key, entity);
            }
            for mut complex in complex_types {
                let key = canonical_home(&resolver, &mut complex, ComplexType::set_namespace)?;
                check_unique(&catalog, &key)?;
                catalog.complex_types.insert(key, complex);
            }
            for mut association in associations {
                let key = canonical_home(&resolver, &mut association, Association::set_namespace)?;
                check_unique(&catalog, &key)?;
                catalog.associations.insert(key, association);
            }
        }

        let model = MetadataModel {
            registry,
            catalog,
            primitive_aliases,
        };
        model.validate()?;

        tracing::debug!(
            namespaces = model.registry.len(),
            declarations = model.catalog.len(),
            "built metadata model"
        );
        Ok(model)
    }
}

/// Rewrite a declaration's namespace to the full name and return its key.
fn canonical_home<T: Declared>(
    resolver: &TypeResolver<'_>,
    declaration: &mut T,
    set_namespace: fn(&mut T, SchemaName),
) -> Result<String, ModelError> {
    let qualified = declaration.qualified_name();
    let resolved = resolver
        .resolve(&qualified)
        .map_err(|e| ModelError::unresolved(format!("declaration of '{qualified}'"), e))?;

    set_namespace(declaration, resolved.namespace.schema_name().clone());
    Ok(resolved.canonical().to_string())
}

// Schema types hold only strings, vectors and plain enums, so encoding cannot fail.
fn fingerprint_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn check_unique(catalog: &SchemaCatalog, key: &str) -> Result<(), ModelError> {
    if catalog.contains(key) {
        return Err(ModelError::DuplicateDeclaration(key.to_string()));
    }
    Ok(())
}

/// A validated, immutable metadata model.
///
/// Owns the namespace registry and every declaration. Safe to share across
/// threads; nothing in it changes after [`ModelBuilder::build`].
#[derive(Debug, Clone)]
pub struct MetadataModel {
    registry: NamespaceRegistry,
    catalog: SchemaCatalog,
    primitive_aliases: Vec<String>,
}

impl MetadataModel {
    /// The document's namespaces.
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// The document's declarations.
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// A resolver bound to this model.
    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.registry)
            .with_catalog(&self.catalog)
            .with_primitive_aliases(&self.primitive_aliases)
    }

    /// Look up a namespace by name or alias.
    pub fn namespace(&self, prefix: &str) -> Option<&Arc<Namespace>> {
        self.registry.lookup(prefix)
    }

    /// Look up an entity type by qualified name (namespace name or alias).
    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        let key = self.canonical_key(name)?;
        self.catalog.entity_types.get(&key)
    }

    /// Look up a complex type by qualified name (namespace name or alias).
    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        let key = self.canonical_key(name)?;
        self.catalog.complex_types.get(&key)
    }

    /// Look up an association by qualified name (namespace name or alias).
    pub fn association(&self, name: &str) -> Option<&Association> {
        let key = self.canonical_key(name)?;
        self.catalog.associations.get(&key)
    }

    fn canonical_key(&self, name: &str) -> Option<String> {
        self.resolver()
            .resolve_str(name)
            .ok()
            .map(|r| r.canonical().to_string())
    }

    /// Entity types ordered by qualified name.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.catalog.entity_types.values()
    }

    /// Complex types ordered by qualified name.
    pub fn complex_types(&self) -> impl Iterator<Item = &ComplexType> {
        self.catalog.complex_types.values()
    }

    /// Associations ordered by qualified name.
    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.catalog.associations.values()
    }

    /// Entity types declared in one namespace (name or alias).
    pub fn entity_types_in<'a>(&'a self, prefix: &str) -> impl Iterator<Item = &'a EntityType> {
        let namespace = self.registry.lookup(prefix).map(|ns| ns.name().to_string());
        self.entity_types()
            .filter(move |e| Some(e.namespace().as_str()) == namespace.as_deref())
    }

    /// Stable hash over namespaces, aliases and declarations.
    ///
    /// Declarations are hashed in their JSON form, the same encoding the
    /// snapshot uses.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut entries = Vec::with_capacity(self.registry.len() + self.catalog.len());

        for namespace in self.registry.iter() {
            entries.push((
                format!("namespace:{}", namespace.name()),
                namespace.alias().unwrap_or_default().to_string(),
            ));
        }
        for (key, entity) in &self.catalog.entity_types {
            entries.push((format!("entity:{key}"), fingerprint_json(entity)));
        }
        for (key, complex) in &self.catalog.complex_types {
            entries.push((format!("complex:{key}"), fingerprint_json(complex)));
        }
        for (key, association) in &self.catalog.associations {
            entries.push((format!("association:{key}"), fingerprint_json(association)));
        }

        Fingerprint::compute(&entries)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn validate(&self) -> Result<(), ModelError> {
        let resolver = self.resolver();

        for (key, entity) in &self.catalog.entity_types {
            self.validate_entity_type(&resolver, key, entity)?;
        }
        for (key, complex) in &self.catalog.complex_types {
            validate_properties(&resolver, key, complex.properties())?;
        }
        for (key, association) in &self.catalog.associations {
            for end in association.ends() {
                resolver.resolve_entity_type(end.type_ref()).map_err(|e| {
                    ModelError::unresolved(format!("end '{}' of '{key}'", end.role()), e)
                })?;
            }
        }
        Ok(())
    }

    fn validate_entity_type(
        &self,
        resolver: &TypeResolver<'_>,
        key: &str,
        entity: &EntityType,
    ) -> Result<(), ModelError> {
        validate_properties(resolver, key, entity.properties())?;

        match entity.base_type() {
            Some(base) => {
                resolver
                    .resolve_entity_type(base)
                    .map_err(|e| ModelError::unresolved(format!("base type of '{key}'"), e))?;
                self.check_inheritance(resolver, key, entity)?;
            }
            None if entity.keys().is_empty() => {
                return Err(ModelError::MissingKey(key.to_string()));
            }
            None => {}
        }

        for k in entity.keys() {
            if entity.property(k.as_str()).is_none() {
                return Err(ModelError::KeyNotFound {
                    entity: key.to_string(),
                    key: k.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for navigation in entity.navigation_properties() {
            let name = navigation.name();
            if !seen.insert(name) || entity.property(name).is_some() {
                return Err(ModelError::DuplicateProperty {
                    owner: key.to_string(),
                    property: name.to_string(),
                });
            }

            let association = resolver
                .resolve_association(navigation.relationship())
                .map_err(|e| {
                    ModelError::unresolved(format!("navigation property '{name}' of '{key}'"), e)
                })?;

            for role in [navigation.from_role(), navigation.to_role()] {
                if association.end(role.as_str()).is_none() {
                    return Err(ModelError::UnknownRole {
                        owner: key.to_string(),
                        navigation: name.to_string(),
                        role: role.to_string(),
                        association: navigation.relationship().to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Walk the base-type chain; revisiting a type means a cycle.
    fn check_inheritance(
        &self,
        resolver: &TypeResolver<'_>,
        key: &str,
        entity: &EntityType,
    ) -> Result<(), ModelError> {
        let mut visited: HashSet<QualifiedName> = HashSet::new();
        visited.insert(entity.qualified_name());

        let mut current = entity;
        while let Some(base) = current.base_type() {
            let parent = resolver
                .resolve_entity_type(base)
                .map_err(|e| ModelError::unresolved(format!("base type of '{key}'"), e))?;
            if !visited.insert(parent.qualified_name()) {
                return Err(ModelError::InheritanceCycle(key.to_string()));
            }
            current = parent;
        }
        Ok(())
    }
}

fn validate_properties(
    resolver: &TypeResolver<'_>,
    owner: &str,
    properties: &[Property],
) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for property in properties {
        if !seen.insert(property.name()) {
            return Err(ModelError::DuplicateProperty {
                owner: owner.to_string(),
                property: property.name().to_string(),
            });
        }

        let resolved = resolver.resolve_type(property.type_ref()).map_err(|e| {
            ModelError::unresolved(format!("property '{}' of '{owner}'", property.name()), e)
        })?;
        if resolved.element_kind() == TypeKind::Entity {
            return Err(ModelError::InvalidPropertyType {
                owner: owner.to_string(),
                property: property.name().to_string(),
                type_ref: property.type_ref().to_string(),
            });
        }
    }
    Ok(())
}
