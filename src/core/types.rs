//! core::types
//!
//! Strong types for schema identity.
//!
//! # Types
//!
//! - [`SchemaName`] - Non-empty name of a schema object or namespace
//! - [`QualifiedName`] - `<prefix>.<local>` reference to a schema type
//! - [`Fingerprint`] - Stable hash over a model's declarations
//!
//! # Validation
//!
//! These types enforce validity at construction time. A nameless schema
//! object cannot be represented.
//!
//! # Examples
//!
//! ```
//! use odata_edm::core::types::{QualifiedName, SchemaName};
//!
//! let name = SchemaName::new("NorthwindModel").unwrap();
//! assert_eq!(name.as_str(), "NorthwindModel");
//!
//! let qn = QualifiedName::parse("NW.Customer").unwrap();
//! assert_eq!(qn.prefix(), "NW");
//! assert_eq!(qn.local_name(), "Customer");
//!
//! assert!(SchemaName::new("").is_err());
//! assert!(QualifiedName::parse("Customer").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("schema object name cannot be empty")]
    MissingName,

    #[error("malformed qualified name '{name}': {reason}")]
    MalformedQualifiedName { name: String, reason: &'static str },
}

/// The identifying name of a schema object.
///
/// Names are immutable once constructed and compared structurally, so two
/// independently built values with the same text are equal and hash alike.
///
/// # Example
///
/// ```
/// use odata_edm::core::types::{SchemaName, TypeError};
///
/// let a = SchemaName::new("ODataDemo").unwrap();
/// let b = SchemaName::new(String::from("ODataDemo")).unwrap();
/// assert_eq!(a, b);
///
/// assert_eq!(SchemaName::new(""), Err(TypeError::MissingName));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaName(String);

impl SchemaName {
    /// Create a new schema name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MissingName` if the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::MissingName);
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SchemaName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SchemaName> for String {
    fn from(name: SchemaName) -> Self {
        name.0
    }
}

impl AsRef<str> for SchemaName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for SchemaName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SchemaName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A namespace-qualified reference of the form `<prefix>.<local>`.
///
/// The prefix is either a full namespace name or an alias. Namespace names
/// may contain dots themselves (`ODataDemo.Model`), so the split happens at
/// the last dot.
///
/// # Example
///
/// ```
/// use odata_edm::core::types::QualifiedName;
///
/// let qn = QualifiedName::parse("ODataDemo.Model.Product").unwrap();
/// assert_eq!(qn.prefix(), "ODataDemo.Model");
/// assert_eq!(qn.local_name(), "Product");
/// assert_eq!(qn.to_string(), "ODataDemo.Model.Product");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    prefix: String,
    local: String,
}

impl QualifiedName {
    /// Parse a qualified name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MalformedQualifiedName` if there is no dot or
    /// either side of the last dot is empty.
    pub fn parse(name: &str) -> Result<Self, TypeError> {
        let malformed = |reason| TypeError::MalformedQualifiedName {
            name: name.to_string(),
            reason,
        };

        let (prefix, local) = name
            .rsplit_once('.')
            .ok_or_else(|| malformed("expected '<namespace-or-alias>.<name>'"))?;

        if prefix.is_empty() {
            return Err(malformed("prefix is empty"));
        }
        if local.is_empty() {
            return Err(malformed("local name is empty"));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            local: local.to_string(),
        })
    }

    /// Build a qualified name from an already validated prefix and local name.
    pub fn from_parts(prefix: &SchemaName, local: &SchemaName) -> Self {
        Self {
            prefix: prefix.as_str().to_string(),
            local: local.as_str().to_string(),
        }
    }

    /// Build from parts already known to be non-empty.
    pub(crate) fn from_raw(prefix: &str, local: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            local: local.to_string(),
        }
    }

    /// The namespace name or alias part.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The unqualified type name.
    pub fn local_name(&self) -> &str {
        &self.local
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}

impl std::str::FromStr for QualifiedName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.prefix, self.local)
    }
}

/// A stable hash over a model's declarations.
///
/// Used to detect whether two loads of a metadata document describe the
/// same schema.
///
/// # Example
///
/// ```
/// use odata_edm::core::types::Fingerprint;
///
/// let a = Fingerprint::compute(&[
///     ("namespace:NorthwindModel".to_string(), "NW".to_string()),
///     ("entity:NorthwindModel.Customer".to_string(), "{}".to_string()),
/// ]);
/// let b = Fingerprint::compute(&[
///     ("entity:NorthwindModel.Customer".to_string(), "{}".to_string()),
///     ("namespace:NorthwindModel".to_string(), "NW".to_string()),
/// ]);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from a set of (key, value) entries.
    ///
    /// Entries are sorted by key before hashing so declaration order does
    /// not matter.
    pub fn compute(entries: &[(String, String)]) -> Self {
        let mut sorted: Vec<_> = entries.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut hasher = Sha256::new();
        for (key, value) in sorted {
            hasher.update(key.as_bytes());
            hasher.update(b"\0");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
