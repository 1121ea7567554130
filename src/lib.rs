//! odata-edm - Entity Data Model namespaces and type resolution
//!
//! Models the schema side of an OData metadata document: namespaces with
//! their optional aliases, the named types declared inside them, and the
//! resolution of `<namespace-or-alias>.<name>` references between them.
//!
//! # Architecture
//!
//! Everything lives under [`core`]:
//!
//! - Identity: [`core::types`], [`core::named`]
//! - Namespaces: [`core::namespace`], [`core::registry`]
//! - Declarations: [`core::schema`], [`core::primitive`]
//! - Resolution: [`core::resolver`]
//! - Document model: [`core::model`], [`core::snapshot`]
//! - Policy: [`core::config`]
//!
//! # Correctness Invariants
//!
//! 1. Every schema object has a non-empty name that never changes
//! 2. Namespace names and aliases are unique within a document
//! 3. A name and its alias resolve to the same namespace
//! 4. A model is published only when every reference in it resolves

pub mod core;
