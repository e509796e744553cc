use std::collections::BTreeMap;

use queryspec_core::interpret::{interpret, NoComputedDefaults};
use queryspec_core::model::schema::{
    AssociationEdge, Cardinality, FieldDef, FieldType, SchemaDescriptor,
};
use queryspec_core::model::{CompareOp, FilterSpec, OperatorSpec, SortSpec};
use queryspec_core::model::{DefaultValue, SortDirection};
use queryspec_core::plan::MAX_BINDING_DEPTH;
use queryspec_core::{BuildError, ListRequest, ScalarValue, SpecList};

fn field(name: &str, field_type: FieldType) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        field_type,
        nullable: None,
        description: None,
    }
}

fn direct(target: &str, owner_key: &str) -> AssociationEdge {
    AssociationEdge::Direct {
        target_schema: target.to_string(),
        owner_key: owner_key.to_string(),
        related_key: "id".to_string(),
        cardinality: Cardinality::One,
    }
}

/// Order -> customer -> region, with a through shortcut for the full path.
fn shop_registry() -> queryspec_core::SchemaRegistry {
    let orders = SchemaDescriptor {
        name: "orders".to_string(),
        fields: vec![
            field("id", FieldType::Integer),
            field("customer_id", FieldType::Integer),
            field("placed_at", FieldType::Timestamp),
        ],
        associations: BTreeMap::from([
            ("customer".to_string(), direct("customers", "customer_id")),
            (
                "region".to_string(),
                AssociationEdge::Through {
                    chain: vec!["customer".to_string(), "region".to_string()],
                },
            ),
        ]),
    };
    let customers = SchemaDescriptor {
        name: "customers".to_string(),
        fields: vec![
            field("id", FieldType::Integer),
            field("name", FieldType::String),
            field("region_id", FieldType::Integer),
        ],
        associations: BTreeMap::from([("region".to_string(), direct("regions", "region_id"))]),
    };
    let regions = SchemaDescriptor {
        name: "regions".to_string(),
        fields: vec![
            field("id", FieldType::Integer),
            field("name", FieldType::String),
        ],
        associations: BTreeMap::new(),
    };
    queryspec_core::SchemaRegistry::new([orders, customers, regions])
}

fn region_filter(path: Vec<&str>) -> FilterSpec {
    FilterSpec {
        key: "region_name".to_string(),
        path: path.into_iter().map(String::from).collect(),
        field: "name".to_string(),
        operator: OperatorSpec::Simple(CompareOp::Eq),
        allow_nil: false,
        default: DefaultValue::None,
    }
}

fn west_request() -> ListRequest {
    ListRequest::from_json(serde_json::json!({"filters": {"region_name": "west"}})).unwrap()
}

#[test]
fn test_two_hop_filter_builds_two_aliased_joins() {
    let registry = shop_registry();
    let specs = SpecList::new(vec![region_filter(vec!["customer", "region"])], vec![]).unwrap();

    let plan = interpret(&registry, "orders", &specs, &west_request(), &NoComputedDefaults).unwrap();

    assert_eq!(plan.base_schema, "orders");
    assert_eq!(plan.bindings.len(), 2);
    assert_eq!(plan.bindings.depth_of("customer"), Some(1));
    assert_eq!(plan.bindings.depth_of("customer_region"), Some(2));

    assert_eq!(plan.predicates.len(), 1);
    assert_eq!(plan.predicates[0].depth, 2);
    assert_eq!(plan.predicates[0].field, "name");
    assert_eq!(plan.predicates[0].op, CompareOp::Eq);
    assert_eq!(
        plan.predicates[0].value,
        ScalarValue::String("west".to_string())
    );
}

#[test]
fn test_through_path_plans_like_its_expansion() {
    // Filtering through the logical "region" association lands on the same
    // physical joins as spelling out customer/region.
    let registry = shop_registry();
    let through = SpecList::new(vec![region_filter(vec!["region"])], vec![]).unwrap();
    let spelled = SpecList::new(vec![region_filter(vec!["customer", "region"])], vec![]).unwrap();

    let from_through =
        interpret(&registry, "orders", &through, &west_request(), &NoComputedDefaults).unwrap();
    let from_spelled =
        interpret(&registry, "orders", &spelled, &west_request(), &NoComputedDefaults).unwrap();

    assert_eq!(from_through, from_spelled);
}

#[test]
fn test_filter_and_default_sort_share_joins_across_specs() {
    let registry = shop_registry();
    let sort = SortSpec {
        key: "region_name".to_string(),
        path: vec!["customer".to_string(), "region".to_string()],
        field: "name".to_string(),
        direction: SortDirection::Asc,
        is_default: true,
    };
    let specs = SpecList::new(vec![region_filter(vec!["customer", "region"])], vec![sort]).unwrap();

    let plan = interpret(&registry, "orders", &specs, &west_request(), &NoComputedDefaults).unwrap();

    // Two different specs asked for the same path; it is joined once and
    // both expressions point at the same depth.
    assert_eq!(plan.bindings.len(), 2);
    assert_eq!(plan.predicates[0].depth, 2);
    assert_eq!(plan.order[0].depth, 2);
}

fn chain_registry(length: usize) -> queryspec_core::SchemaRegistry {
    let mut schemas = Vec::new();
    for index in 0..=length {
        let mut associations = BTreeMap::new();
        if index < length {
            associations.insert(
                "next".to_string(),
                direct(&format!("level{}", index + 1), "next_id"),
            );
        }
        schemas.push(SchemaDescriptor {
            name: format!("level{index}"),
            fields: vec![field("id", FieldType::Integer), field("name", FieldType::String)],
            associations,
        });
    }
    queryspec_core::SchemaRegistry::new(schemas)
}

fn chain_filter(hops: usize) -> FilterSpec {
    FilterSpec {
        key: "deep_name".to_string(),
        path: vec!["next".to_string(); hops],
        field: "name".to_string(),
        operator: OperatorSpec::Simple(CompareOp::Eq),
        allow_nil: false,
        default: DefaultValue::None,
    }
}

#[test]
fn test_depth_ceiling_yields_unsupported_depth_not_a_truncated_plan() {
    let over = MAX_BINDING_DEPTH + 1;
    let registry = chain_registry(over);
    let specs = SpecList::new(vec![chain_filter(over)], vec![]).unwrap();
    let request =
        ListRequest::from_json(serde_json::json!({"filters": {"deep_name": "x"}})).unwrap();

    let error = interpret(&registry, "level0", &specs, &request, &NoComputedDefaults).unwrap_err();
    assert_eq!(
        error,
        BuildError::UnsupportedDepth {
            depth: over,
            max: MAX_BINDING_DEPTH,
        }
    );
}

#[test]
fn test_chain_at_the_ceiling_still_plans() {
    let registry = chain_registry(MAX_BINDING_DEPTH);
    let specs = SpecList::new(vec![chain_filter(MAX_BINDING_DEPTH)], vec![]).unwrap();
    let request =
        ListRequest::from_json(serde_json::json!({"filters": {"deep_name": "x"}})).unwrap();

    let plan = interpret(&registry, "level0", &specs, &request, &NoComputedDefaults).unwrap();
    assert_eq!(plan.bindings.len(), MAX_BINDING_DEPTH);
    assert_eq!(plan.predicates[0].depth, MAX_BINDING_DEPTH);
}
