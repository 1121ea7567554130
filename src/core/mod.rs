//! core
//!
//! Domain types, registries and resolution for EDM metadata.
//!
//! # Modules
//!
//! - [`types`] - Strong types: SchemaName, QualifiedName, Fingerprint
//! - [`named`] - The `Named` capability shared by schema entities
//! - [`namespace`] - Namespaces and their build phase
//! - [`registry`] - Document-wide namespace registry
//! - [`schema`] - Entity types, complex types, associations
//! - [`primitive`] - EDM primitive types
//! - [`resolver`] - Qualified-name and type-reference resolution
//! - [`model`] - Metadata model and its validating builder
//! - [`snapshot`] - JSON snapshot of a built model
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Published values are immutable
//! - Validation fails the whole load, never part of it

pub mod config;
pub mod model;
pub mod named;
pub mod namespace;
pub mod primitive;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod snapshot;
pub mod types;
