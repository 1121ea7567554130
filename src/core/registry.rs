//! core::registry
//!
//! Document-wide registry of schema namespaces.
//!
//! # Keys
//!
//! Every namespace is reachable by its full name and, if it declared one,
//! by its alias. Both keys lead to the same shared [`Namespace`].
//!
//! # Invariants
//!
//! - Namespace names are unique.
//! - Aliases are unique among all aliases in the registry.
//! - Unless shadowing is allowed, no alias equals a namespace name.
//! - Reserved names (`Edm`, `System`, `Transient` by default, plus any
//!   configured primitive namespace alias) are never declared.
//!
//! Registration is all-or-nothing: a rejected namespace leaves the registry
//! untouched.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use odata_edm::core::namespace::NamespaceBuilder;
//! use odata_edm::core::registry::NamespaceRegistry;
//!
//! let mut registry = NamespaceRegistry::new();
//! let ns = NamespaceBuilder::new("NorthwindModel").unwrap().with_alias("NW");
//! registry.register(ns).unwrap();
//!
//! let by_name = registry.get("NorthwindModel").unwrap();
//! let by_alias = registry.get_by_alias("NW").unwrap();
//! assert!(Arc::ptr_eq(by_name, by_alias));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::core::config::Config;
use crate::core::named::Named;
use crate::core::namespace::{Namespace, NamespaceBuilder};

/// Errors from namespace registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("namespace '{0}' is already declared")]
    DuplicateNamespace(String),

    #[error("alias '{alias}' of namespace '{namespace}' is already used by namespace '{existing}'")]
    DuplicateAlias {
        alias: String,
        namespace: String,
        existing: String,
    },

    #[error("'{name}' is used both as a namespace name and as an alias of namespace '{aliased}'")]
    AliasShadowsNamespace { name: String, aliased: String },

    #[error("'{0}' is a reserved namespace")]
    ReservedNamespace(String),
}

/// Registry policy, usually derived from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryPolicy {
    /// Names that may not be declared as a namespace name or alias
    pub reserved: Vec<String>,
    /// Allow an alias to equal another namespace's full name
    pub allow_alias_shadowing: bool,
}

impl Default for RegistryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RegistryPolicy {
    /// Build the policy from configuration.
    ///
    /// Primitive namespace aliases are reserved alongside the configured
    /// names, so no declared namespace can claim one.
    pub fn from_config(config: &Config) -> Self {
        let mut reserved: Vec<String> = config
            .reserved_namespaces()
            .into_iter()
            .map(str::to_string)
            .collect();
        for alias in config.primitive_namespace_aliases() {
            if !reserved.contains(alias) {
                reserved.push(alias.clone());
            }
        }

        Self {
            reserved,
            allow_alias_shadowing: config.allow_alias_shadowing(),
        }
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|r| r == name)
    }
}

/// Namespaces of one metadata document, keyed by name and by alias.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    policy: RegistryPolicy,
    /// Declaration order
    namespaces: Vec<Arc<Namespace>>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl NamespaceRegistry {
    /// Create an empty registry with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with an explicit policy.
    pub fn with_policy(policy: RegistryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The policy in effect.
    pub fn policy(&self) -> &RegistryPolicy {
        &self.policy
    }

    /// Publish a namespace into the registry.
    ///
    /// # Errors
    ///
    /// Returns a `RegistryError` if the name or alias conflicts with what is
    /// already registered or is reserved. Nothing is inserted on error.
    pub fn register(&mut self, builder: NamespaceBuilder) -> Result<Arc<Namespace>, RegistryError> {
        self.insert(builder.build())
    }

    /// Publish an already built namespace.
    pub fn insert(&mut self, namespace: Namespace) -> Result<Arc<Namespace>, RegistryError> {
        self.check(&namespace)?;

        let index = self.namespaces.len();
        let namespace = Arc::new(namespace);

        self.by_name.insert(namespace.name().to_string(), index);
        if let Some(alias) = namespace.alias() {
            self.by_alias.insert(alias.to_string(), index);
        }
        self.namespaces.push(Arc::clone(&namespace));

        tracing::debug!(
            namespace = namespace.name(),
            alias = ?namespace.alias(),
            "registered namespace"
        );
        Ok(namespace)
    }

    fn check(&self, namespace: &Namespace) -> Result<(), RegistryError> {
        let name = namespace.name();

        if self.policy.is_reserved(name) {
            return Err(RegistryError::ReservedNamespace(name.to_string()));
        }
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateNamespace(name.to_string()));
        }
        if !self.policy.allow_alias_shadowing {
            if let Some(&index) = self.by_alias.get(name) {
                return Err(RegistryError::AliasShadowsNamespace {
                    name: name.to_string(),
                    aliased: self.namespaces[index].name().to_string(),
                });
            }
        }

        if let Some(alias) = namespace.alias() {
            if self.policy.is_reserved(alias) {
                return Err(RegistryError::ReservedNamespace(alias.to_string()));
            }
            if let Some(&index) = self.by_alias.get(alias) {
                return Err(RegistryError::DuplicateAlias {
                    alias: alias.to_string(),
                    namespace: name.to_string(),
                    existing: self.namespaces[index].name().to_string(),
                });
            }
            if !self.policy.allow_alias_shadowing
                && (alias == name || self.by_name.contains_key(alias))
            {
                return Err(RegistryError::AliasShadowsNamespace {
                    name: alias.to_string(),
                    aliased: name.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Look up a namespace by full name.
    pub fn get(&self, name: &str) -> Option<&Arc<Namespace>> {
        self.by_name.get(name).map(|&i| &self.namespaces[i])
    }

    /// Look up a namespace by alias.
    pub fn get_by_alias(&self, alias: &str) -> Option<&Arc<Namespace>> {
        self.by_alias.get(alias).map(|&i| &self.namespaces[i])
    }

    /// Look up a qualified-name prefix: full name first, then alias.
    pub fn lookup(&self, prefix: &str) -> Option<&Arc<Namespace>> {
        self.get(prefix).or_else(|| self.get_by_alias(prefix))
    }

    /// Whether `prefix` names a registered namespace or alias.
    pub fn contains(&self, prefix: &str) -> bool {
        self.lookup(prefix).is_some()
    }

    /// Whether `name` is a reserved namespace under the current policy.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.policy.is_reserved(name)
    }

    /// Number of registered namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Whether no namespace is registered.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Iterate namespaces in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Namespace>> {
        self.namespaces.iter()
    }
}
