//! core::namespace
//!
//! Schema namespaces and their optional aliases.
//!
//! # Lifecycle
//!
//! A namespace goes through two phases:
//! - **Build**: a [`NamespaceBuilder`] is created per namespace declaration
//!   while a metadata document is read. The alias may be assigned here.
//! - **Published**: [`NamespaceBuilder::build`] yields an immutable
//!   [`Namespace`], which is what registries store and share.
//!
//! Neither type validates the alias. Uniqueness across a document is the
//! registry's job since only it sees every namespace.
//!
//! # Example
//!
//! ```
//! use odata_edm::core::named::Named;
//! use odata_edm::core::namespace::NamespaceBuilder;
//!
//! let mut builder = NamespaceBuilder::new("NorthwindModel").unwrap();
//! assert_eq!(builder.alias(), None);
//!
//! builder.set_alias("NW");
//! let ns = builder.build();
//! assert_eq!(ns.name(), "NorthwindModel");
//! assert_eq!(ns.alias(), Some("NW"));
//! ```

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::named::Named;
use crate::core::types::{SchemaName, TypeError};

/// A namespace under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBuilder {
    name: SchemaName,
    alias: Option<String>,
}

impl NamespaceBuilder {
    /// Start building a namespace. The alias starts absent.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MissingName` if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        Ok(Self::from_name(SchemaName::new(name)?))
    }

    /// Start building a namespace from an already validated name.
    pub fn from_name(name: SchemaName) -> Self {
        Self { name, alias: None }
    }

    /// The current alias, if one was set.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Record the short alias. The last value set wins.
    pub fn set_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.alias = Some(alias.into());
        self
    }

    /// Builder-style variant of [`set_alias`](Self::set_alias).
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.set_alias(alias);
        self
    }

    /// Freeze the namespace.
    pub fn build(self) -> Namespace {
        Namespace {
            name: self.name,
            alias: self.alias,
        }
    }
}

impl Named for NamespaceBuilder {
    fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

/// A published schema namespace.
///
/// Immutable: there is no way to change the name or alias once built.
/// Equality and hashing consider the name only, matching how registries
/// key namespaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Namespace {
    name: SchemaName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
}

impl Namespace {
    /// The short alias, if the declaration carried one.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Whether `prefix` names this namespace, by full name or by alias.
    pub fn answers_to(&self, prefix: &str) -> bool {
        self.name.as_str() == prefix || self.alias() == Some(prefix)
    }

    /// Reopen the namespace as a builder, e.g. to re-declare it elsewhere.
    pub fn to_builder(&self) -> NamespaceBuilder {
        NamespaceBuilder {
            name: self.name.clone(),
            alias: self.alias.clone(),
        }
    }
}

impl Named for Namespace {
    fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Namespace {}

impl Hash for Namespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} (alias {})", self.name, alias),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_keeps_name() {
        let ns = NamespaceBuilder::new("ODataDemo").unwrap().build();
        assert_eq!(ns.name(), "ODataDemo");
    }

    #[test]
    fn alias_absent_before_set() {
        let builder = NamespaceBuilder::new("ODataDemo").unwrap();
        assert_eq!(builder.alias(), None);
        assert_eq!(builder.build().alias(), None);
    }

    #[test]
    fn set_alias_then_get() {
        let mut builder = NamespaceBuilder::new("NorthwindModel").unwrap();
        builder.set_alias("NW");
        assert_eq!(builder.alias(), Some("NW"));

        let ns = builder.build();
        assert_eq!(ns.alias(), Some("NW"));
        assert_eq!(ns.name(), "NorthwindModel");
    }

    #[test]
    fn set_alias_is_idempotent() {
        let mut builder = NamespaceBuilder::new("NorthwindModel").unwrap();
        builder.set_alias("NW").set_alias("NW");
        assert_eq!(builder.alias(), Some("NW"));
    }

    #[test]
    fn last_alias_wins() {
        let builder = NamespaceBuilder::new("NorthwindModel")
            .unwrap()
            .with_alias("N")
            .with_alias("NW");
        assert_eq!(builder.alias(), Some("NW"));
    }

    #[test]
    fn alias_is_not_validated() {
        let builder = NamespaceBuilder::new("NorthwindModel")
            .unwrap()
            .with_alias("");
        assert_eq!(builder.alias(), Some(""));
    }

    #[test]
    fn missing_name_rejected() {
        assert_eq!(NamespaceBuilder::new(""), Err(TypeError::MissingName));
    }

    #[test]
    fn distinct_instances_equal_by_name() {
        let a = NamespaceBuilder::new("NorthwindModel").unwrap().build();
        let b = NamespaceBuilder::new("NorthwindModel")
            .unwrap()
            .with_alias("NW")
            .build();
        assert!(!std::ptr::eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn answers_to_name_and_alias() {
        let ns = NamespaceBuilder::new("NorthwindModel")
            .unwrap()
            .with_alias("NW")
            .build();
        assert!(ns.answers_to("NorthwindModel"));
        assert!(ns.answers_to("NW"));
        assert!(!ns.answers_to("Northwind"));
    }

    #[test]
    fn serde_omits_absent_alias() {
        let ns = NamespaceBuilder::new("ODataDemo").unwrap().build();
        let json = serde_json::to_string(&ns).unwrap();
        assert_eq!(json, r#"{"name":"ODataDemo"}"#);
    }

    #[test]
    fn serde_rejects_unknown_fields() {
        let result: Result<Namespace, _> =
            serde_json::from_str(r#"{"name":"ODataDemo","prefix":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn to_builder_preserves_alias() {
        let ns = NamespaceBuilder::new("NorthwindModel")
            .unwrap()
            .with_alias("NW")
            .build();
        assert_eq!(ns.to_builder().alias(), Some("NW"));
    }
}
