//! core::snapshot
//!
//! Self-describing JSON snapshot of a built model (v1).
//!
//! # Schema Design
//!
//! - Self-describing with `kind` and `schema_version`
//! - Strictly parsed (unknown fields rejected)
//! - Reloading goes through [`ModelBuilder`], so every model invariant is
//!   checked again
//!
//! # Example
//!
//! ```
//! use odata_edm::core::config::Config;
//! use odata_edm::core::model::ModelBuilder;
//! use odata_edm::core::namespace::NamespaceBuilder;
//! use odata_edm::core::snapshot::{parse_snapshot, to_snapshot_json};
//!
//! let mut builder = ModelBuilder::new();
//! builder
//!     .declare_namespace(NamespaceBuilder::new("NorthwindModel").unwrap().with_alias("NW"))
//!     .unwrap();
//! let model = builder.build().unwrap();
//!
//! let json = to_snapshot_json(&model).unwrap();
//! let reloaded = parse_snapshot(&json, &Config::default()).unwrap();
//! assert_eq!(model.fingerprint(), reloaded.fingerprint());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::Config;
use crate::core::model::{MetadataModel, ModelBuilder, ModelError};
use crate::core::namespace::Namespace;
use crate::core::schema::{Association, ComplexType, EntityType};

/// The kind identifier for model snapshots.
pub const SNAPSHOT_KIND: &str = "odata-edm.model-snapshot";

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to parse snapshot: {0}")]
    ParseError(String),

    #[error("failed to serialize snapshot: {0}")]
    SerializeError(String),

    #[error("invalid kind '{found}', expected '{}'", SNAPSHOT_KIND)]
    InvalidKind { found: String },

    #[error("unsupported schema version {0}, supported: {SNAPSHOT_VERSION}")]
    UnsupportedVersion(u32),

    #[error("snapshot does not describe a valid model: {0}")]
    Model(#[from] ModelError),
}

/// Envelope for version dispatch before full parsing.
#[derive(Debug, Deserialize)]
struct SnapshotEnvelope {
    kind: String,
    schema_version: u32,
}

/// Snapshot contents, version 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSnapshotV1 {
    pub kind: String,
    pub schema_version: u32,
    pub namespaces: Vec<Namespace>,
    #[serde(default)]
    pub entity_types: Vec<EntityType>,
    #[serde(default)]
    pub complex_types: Vec<ComplexType>,
    #[serde(default)]
    pub associations: Vec<Association>,
}

impl ModelSnapshotV1 {
    /// Capture a built model.
    pub fn from_model(model: &MetadataModel) -> Self {
        Self {
            kind: SNAPSHOT_KIND.to_string(),
            schema_version: SNAPSHOT_VERSION,
            namespaces: model.registry().iter().map(|ns| (**ns).clone()).collect(),
            entity_types: model.entity_types().cloned().collect(),
            complex_types: model.complex_types().cloned().collect(),
            associations: model.associations().cloned().collect(),
        }
    }

    /// Rebuild and revalidate the model.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Model` if the contents violate any model
    /// invariant.
    pub fn into_model(self, config: &Config) -> Result<MetadataModel, SnapshotError> {
        let mut builder = ModelBuilder::with_config(config);
        for namespace in &self.namespaces {
            builder.declare_namespace(namespace.to_builder())?;
        }
        for entity in self.entity_types {
            builder.add_entity_type(entity);
        }
        for complex in self.complex_types {
            builder.add_complex_type(complex);
        }
        for association in self.associations {
            builder.add_association(association);
        }
        Ok(builder.build()?)
    }
}

/// Serialize a model as a snapshot.
pub fn to_snapshot_json(model: &MetadataModel) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(&ModelSnapshotV1::from_model(model))
        .map_err(|e| SnapshotError::SerializeError(e.to_string()))
}

/// Parse snapshot JSON with version dispatch and rebuild the model.
///
/// # Errors
///
/// Returns an error if:
/// - The JSON is malformed
/// - The `kind` field doesn't match `SNAPSHOT_KIND`
/// - The `schema_version` is not supported
/// - The contents do not form a valid model
pub fn parse_snapshot(json: &str, config: &Config) -> Result<MetadataModel, SnapshotError> {
    let envelope: SnapshotEnvelope =
        serde_json::from_str(json).map_err(|e| SnapshotError::ParseError(e.to_string()))?;

    if envelope.kind != SNAPSHOT_KIND {
        return Err(SnapshotError::InvalidKind {
            found: envelope.kind,
        });
    }

    match envelope.schema_version {
        1 => {
            let snapshot: ModelSnapshotV1 = serde_json::from_str(json)
                .map_err(|e| SnapshotError::ParseError(e.to_string()))?;
            tracing::debug!(
                namespaces = snapshot.namespaces.len(),
                "parsed model snapshot"
            );
            snapshot.into_model(config)
        }
        v => Err(SnapshotError::UnsupportedVersion(v)),
    }
}
