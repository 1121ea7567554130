//! Integration tests for building and querying a metadata model.
//!
//! These tests drive the builder the way a metadata-document reader would:
//! declare namespaces, assign aliases, add declarations, then resolve
//! qualified references against the published model.

use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use odata_edm::core::config::Config;
use odata_edm::core::model::{MetadataModel, ModelBuilder, ModelError};
use odata_edm::core::named::Named;
use odata_edm::core::namespace::NamespaceBuilder;
use odata_edm::core::primitive::EdmPrimitive;
use odata_edm::core::registry::RegistryError;
use odata_edm::core::resolver::{ResolveError, TypeRef};
use odata_edm::core::schema::{
    Association, AssociationEnd, ComplexType, EntityType, Multiplicity, NavigationProperty,
    Property, TypeReference,
};
use odata_edm::core::snapshot::{parse_snapshot, to_snapshot_json};

// =============================================================================
// Test Helpers
// =============================================================================

/// Build the Northwind sample: two entity types, one complex type and an
/// association, declared through a mix of full names and the `NW` alias.
fn northwind(config: &Config) -> Result<MetadataModel, ModelError> {
    let mut builder = ModelBuilder::with_config(config);

    let mut ns = NamespaceBuilder::new("NorthwindModel")?;
    ns.set_alias("NW");
    builder.declare_namespace(ns)?;

    builder.add_complex_type(
        ComplexType::new("NorthwindModel", "Address")?
            .with_property(Property::new("Street", "Edm.String")?)
            .with_property(Property::new("City", "Edm.String")?),
    );

    builder.add_entity_type(
        EntityType::new("NW", "Customer")?
            .with_property(Property::new("CustomerID", "Edm.String")?.nullable(false))
            .with_property(Property::new("Address", "NW.Address")?)
            .with_key("CustomerID")?
            .with_navigation(NavigationProperty::new(
                "Orders",
                "NW.FK_Orders_Customers",
                "Customers",
                "Orders",
            )?),
    );

    builder.add_entity_type(
        EntityType::new("NorthwindModel", "Order")?
            .with_property(Property::new("OrderID", "Edm.Int32")?.nullable(false))
            .with_property(Property::new("ShipTo", "Collection(NorthwindModel.Address)")?)
            .with_key("OrderID")?
            .with_navigation(NavigationProperty::new(
                "Customer",
                "NorthwindModel.FK_Orders_Customers",
                "Orders",
                "Customers",
            )?),
    );

    builder.add_association(Association::new(
        "NW",
        "FK_Orders_Customers",
        [
            AssociationEnd::new("Customers", "NW.Customer", Multiplicity::ZeroOrOne)?,
            AssociationEnd::new("Orders", "NorthwindModel.Order", Multiplicity::Many)?,
        ],
    )?);

    builder.build()
}

// =============================================================================
// Namespace resolution
// =============================================================================

#[test]
fn northwind_scenario() {
    let mut ns = NamespaceBuilder::new("NorthwindModel").unwrap();
    ns.set_alias("NW");
    assert_eq!(ns.alias(), Some("NW"));
    assert_eq!(ns.name(), "NorthwindModel");
}

#[test]
fn alias_reference_resolves_to_same_namespace_object() {
    let model = northwind(&Config::default()).unwrap();
    let resolver = model.resolver();

    let short = resolver.resolve_str("NW.Customer").unwrap();
    let long = resolver.resolve_str("NorthwindModel.Customer").unwrap();
    assert!(Arc::ptr_eq(&short.namespace, &long.namespace));
    assert!(Arc::ptr_eq(
        &short.namespace,
        model.registry().get("NorthwindModel").unwrap()
    ));
}

#[test]
fn unresolved_prefix_is_reported() {
    let model = northwind(&Config::default()).unwrap();
    let err = model.resolver().resolve_str("Northwind.Customer").unwrap_err();
    assert!(matches!(err, ResolveError::UnresolvedPrefix { .. }));
    assert!(model.entity_type("Northwind.Customer").is_none());
}

// =============================================================================
// Type resolution
// =============================================================================

#[test]
fn type_references_resolve_through_model() {
    let model = northwind(&Config::default()).unwrap();
    let resolver = model.resolver();

    let address = TypeReference::parse("Collection(NW.Address)").unwrap();
    match resolver.resolve_type(&address).unwrap() {
        TypeRef::Collection(inner) => match *inner {
            TypeRef::Complex(complex) => assert_eq!(complex.name(), "Address"),
            other => panic!("expected complex type, got {other:?}"),
        },
        other => panic!("expected collection, got {other:?}"),
    }

    let id = TypeReference::parse("Edm.Int32").unwrap();
    assert_eq!(
        resolver.resolve_type(&id).unwrap(),
        TypeRef::Primitive(EdmPrimitive::Int32)
    );

    let customer = TypeReference::parse("NorthwindModel.Customer").unwrap();
    assert!(matches!(
        resolver.resolve_type(&customer).unwrap(),
        TypeRef::Entity(_)
    ));
}

#[test]
fn lookups_accept_alias_and_full_name() {
    let model = northwind(&Config::default()).unwrap();

    assert!(model.complex_type("NW.Address").is_some());
    assert!(model.association("NorthwindModel.FK_Orders_Customers").is_some());
    assert!(std::ptr::eq(
        model.association("NW.FK_Orders_Customers").unwrap(),
        model.association("NorthwindModel.FK_Orders_Customers").unwrap()
    ));
    assert_eq!(model.entity_types().count(), 2);
}

// =============================================================================
// Whole-load failure
// =============================================================================

#[test]
fn missing_name_aborts_before_build() {
    let result = NamespaceBuilder::new("");
    assert!(result.is_err());
}

#[test]
fn duplicate_alias_fails_load() {
    let mut builder = ModelBuilder::new();
    builder
        .declare_namespace(NamespaceBuilder::new("NorthwindModel").unwrap().with_alias("NW"))
        .unwrap();

    let err = builder
        .declare_namespace(NamespaceBuilder::new("NorthwindExtensions").unwrap().with_alias("NW"))
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::Registry(RegistryError::DuplicateAlias {
            alias: "NW".into(),
            namespace: "NorthwindExtensions".into(),
            existing: "NorthwindModel".into(),
        })
    );
}

#[test]
fn unresolved_property_type_fails_load() {
    let mut builder = ModelBuilder::new();
    builder
        .declare_namespace(NamespaceBuilder::new("NorthwindModel").unwrap().with_alias("NW"))
        .unwrap();
    builder.add_entity_type(
        EntityType::new("NW", "Customer")
            .unwrap()
            .with_property(Property::new("CustomerID", "Edm.String").unwrap())
            .with_property(Property::new("Address", "NW.Address").unwrap())
            .with_key("CustomerID")
            .unwrap(),
    );

    let err = builder.build().unwrap_err();
    assert!(matches!(
        err,
        ModelError::Unresolved {
            source: ResolveError::UnresolvedType(_),
            ..
        }
    ));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn config_file_drives_registry_policy() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(
        &path,
        r#"
        [registry]
        reserved_namespaces = ["Internal"]
        allow_alias_shadowing = true

        [resolver]
        primitive_namespace_aliases = ["edm"]
        "#,
    )
    .unwrap();
    let config = Config::load_from(&path).unwrap();

    let mut builder = ModelBuilder::with_config(&config);
    builder
        .declare_namespace(NamespaceBuilder::new("Sales").unwrap().with_alias("S"))
        .unwrap();
    builder
        .declare_namespace(NamespaceBuilder::new("S").unwrap())
        .unwrap();
    assert!(builder
        .declare_namespace(NamespaceBuilder::new("Internal").unwrap())
        .is_err());

    builder.add_entity_type(
        EntityType::new("Sales", "Invoice")
            .unwrap()
            .with_property(Property::new("ID", "edm.Guid").unwrap())
            .with_key("ID")
            .unwrap(),
    );

    let model = builder.build().unwrap();
    assert_eq!(model.namespace("S").unwrap().name(), "S");
    assert!(model.entity_type("Sales.Invoice").is_some());
}

#[test]
fn primitive_alias_cannot_be_declared_as_namespace_alias() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[resolver]\nprimitive_namespace_aliases = [\"NW\"]\n").unwrap();
    let config = Config::load_from(&path).unwrap();

    let err = northwind(&config).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Registry(RegistryError::ReservedNamespace(ref name)) if name == "NW"
    ));
}

#[test]
fn primitive_alias_overlapping_reserved_name_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[resolver]\nprimitive_namespace_aliases = [\"System\"]\n").unwrap();

    assert!(Config::load_from(&path).is_err());
}

// =============================================================================
// Snapshots and sharing
// =============================================================================

#[test]
fn snapshot_roundtrip_keeps_fingerprint() {
    let config = Config::default();
    let model = northwind(&config).unwrap();

    let json = to_snapshot_json(&model).unwrap();
    let reloaded = parse_snapshot(&json, &config).unwrap();

    assert_eq!(model.fingerprint(), reloaded.fingerprint());
    assert_eq!(reloaded.namespace("NW").unwrap().name(), "NorthwindModel");
}

#[test]
fn published_model_is_shared_across_threads() {
    let model = Arc::new(northwind(&Config::default()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = Arc::clone(&model);
            thread::spawn(move || {
                model
                    .resolver()
                    .resolve_str("NW.Order")
                    .map(|r| r.canonical().to_string())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "NorthwindModel.Order");
    }
}
