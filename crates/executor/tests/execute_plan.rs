use std::collections::BTreeMap;

use polars::prelude::*;

use executor::{execute, execute_one, execute_page, frame_to_json_rows, FrameSource};
use queryspec_core::interpret::{interpret, NoComputedDefaults};
use queryspec_core::model::schema::{
    AssociationEdge, Cardinality, FieldDef, FieldType, SchemaDescriptor,
};
use queryspec_core::model::{
    CompareOp, DefaultValue, FilterSpec, OperatorSpec, SortDirection, SortSpec,
};
use queryspec_core::{ListRequest, ScalarValue, SchemaRegistry, SpecList};

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

fn registry() -> SchemaRegistry {
    let orders = SchemaDescriptor {
        name: "orders".to_string(),
        fields: vec![
            field("id", FieldType::Integer),
            field("customer_id", FieldType::Integer),
            field("status", FieldType::String),
            field("total", FieldType::Float),
            field("archived_at", FieldType::Timestamp),
        ],
        associations: BTreeMap::from([(
            "customer".to_string(),
            direct("customers", "customer_id"),
        )]),
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
    SchemaRegistry::new([orders, customers, regions])
}

fn source() -> FrameSource {
    let orders = df!(
        "id" => &[1, 2, 3, 4],
        "customer_id" => &[10, 20, 30, 10],
        "status" => &["new", "shipped", "new", "cancelled"],
        "total" => &[5.0, 50.0, 500.0, 7.5],
        "archived_at" => &[None, Some("2024-03-01T00:00:00Z"), None, None],
    )
    .unwrap();
    let customers = df!(
        "id" => &[10, 20, 30],
        "name" => &["ann", "bob", "cat"],
        "region_id" => &[100, 200, 100],
    )
    .unwrap();
    let regions = df!(
        "id" => &[100, 200],
        "name" => &["west", "east"],
    )
    .unwrap();

    let mut source = FrameSource::new();
    source.insert("orders", orders);
    source.insert("customers", customers);
    source.insert("regions", regions);
    source
}

fn region_name_spec() -> FilterSpec {
    FilterSpec {
        key: "region_name".to_string(),
        path: vec!["customer".to_string(), "region".to_string()],
        field: "name".to_string(),
        operator: OperatorSpec::Simple(CompareOp::Eq),
        allow_nil: false,
        default: DefaultValue::None,
    }
}

fn newest_sort() -> SortSpec {
    SortSpec {
        key: "newest".to_string(),
        path: vec![],
        field: "id".to_string(),
        direction: SortDirection::Desc,
        is_default: true,
    }
}

fn plan_for(
    specs: &SpecList,
    payload: serde_json::Value,
) -> queryspec_core::QueryPlan {
    let request = ListRequest::from_json(payload).unwrap();
    interpret(&registry(), "orders", specs, &request, &NoComputedDefaults).unwrap()
}

fn ids(frame: &DataFrame) -> Vec<i32> {
    frame
        .column("id")
        .unwrap()
        .i32()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

#[test]
fn test_two_hop_filter_with_default_sort() {
    let specs = SpecList::new(vec![region_name_spec()], vec![newest_sort()]).unwrap();
    let plan = plan_for(&specs, serde_json::json!({"filters": {"region_name": "west"}}));

    let frame = execute(&plan, &source()).unwrap();
    assert_eq!(ids(&frame), vec![4, 3, 1]);
}

#[test]
fn test_sort_by_joined_field() {
    let sort = SortSpec {
        key: "customer_name".to_string(),
        path: vec!["customer".to_string()],
        field: "name".to_string(),
        direction: SortDirection::Asc,
        is_default: false,
    };
    let specs = SpecList::new(vec![region_name_spec()], vec![sort, newest_sort()]).unwrap();
    let plan = plan_for(
        &specs,
        serde_json::json!({
            "filters": {"region_name": "west"},
            "sort": ["customer_name", "newest:desc"],
        }),
    );

    // ann before cat, the ann tie broken by id descending.
    let frame = execute(&plan, &source()).unwrap();
    assert_eq!(ids(&frame), vec![4, 1, 3]);
}

#[test]
fn test_nullness_default_excludes_archived_rows() {
    let is_active = FilterSpec {
        key: "is_active".to_string(),
        path: vec![],
        field: "archived_at".to_string(),
        operator: OperatorSpec::Conditional {
            truthy: CompareOp::IsNil,
            falsy: CompareOp::NotNil,
        },
        allow_nil: false,
        default: DefaultValue::Literal(ScalarValue::Bool(true)),
    };
    let specs = SpecList::new(vec![is_active], vec![newest_sort()]).unwrap();

    let plan = plan_for(&specs, serde_json::json!({}));
    let frame = execute(&plan, &source()).unwrap();
    assert_eq!(ids(&frame), vec![4, 3, 1]);

    let plan = plan_for(&specs, serde_json::json!({"filters": {"is_active": false}}));
    let frame = execute(&plan, &source()).unwrap();
    assert_eq!(ids(&frame), vec![2]);
}

#[test]
fn test_set_membership_fold() {
    let status_in = FilterSpec {
        key: "status_in".to_string(),
        path: vec![],
        field: "status".to_string(),
        operator: OperatorSpec::Simple(CompareOp::In),
        allow_nil: false,
        default: DefaultValue::None,
    };
    let specs = SpecList::new(vec![status_in], vec![newest_sort()]).unwrap();

    let plan = plan_for(
        &specs,
        serde_json::json!({"filters": {"status_in": ["new", "cancelled"]}}),
    );
    let frame = execute(&plan, &source()).unwrap();
    assert_eq!(ids(&frame), vec![4, 3, 1]);

    // Empty membership matches no rows.
    let plan = plan_for(&specs, serde_json::json!({"filters": {"status_in": []}}));
    let frame = execute(&plan, &source()).unwrap();
    assert!(ids(&frame).is_empty());
}

#[test]
fn test_not_in_with_empty_list_matches_everything() {
    let status_not_in = FilterSpec {
        key: "status_not_in".to_string(),
        path: vec![],
        field: "status".to_string(),
        operator: OperatorSpec::Simple(CompareOp::NotIn),
        allow_nil: false,
        default: DefaultValue::None,
    };
    let specs = SpecList::new(vec![status_not_in], vec![newest_sort()]).unwrap();

    let plan = plan_for(&specs, serde_json::json!({"filters": {"status_not_in": []}}));
    let frame = execute(&plan, &source()).unwrap();
    assert_eq!(ids(&frame), vec![4, 3, 2, 1]);
}

#[test]
fn test_range_filter_on_base_field() {
    let min_total = FilterSpec {
        key: "min_total".to_string(),
        path: vec![],
        field: "total".to_string(),
        operator: OperatorSpec::Simple(CompareOp::Gte),
        allow_nil: false,
        default: DefaultValue::None,
    };
    let specs = SpecList::new(vec![min_total], vec![newest_sort()]).unwrap();

    let plan = plan_for(&specs, serde_json::json!({"filters": {"min_total": 10}}));
    let frame = execute(&plan, &source()).unwrap();
    assert_eq!(ids(&frame), vec![3, 2]);
}

#[test]
fn test_page_window_and_counts() {
    let specs = SpecList::new(vec![], vec![newest_sort()]).unwrap();
    let plan = plan_for(&specs, serde_json::json!({}));

    let (page, info) = execute_page(&plan, &source(), 2, 1).unwrap();
    assert_eq!(ids(&page), vec![3, 2]);
    assert_eq!(info.total_count, 4);
    assert_eq!(info.total_pages, 2);
    assert!(info.has_next_page);
    assert!(info.has_previous_page);
}

#[test]
fn test_single_record_lookup() {
    let by_id = FilterSpec {
        key: "id".to_string(),
        path: vec![],
        field: "id".to_string(),
        operator: OperatorSpec::Simple(CompareOp::Eq),
        allow_nil: false,
        default: DefaultValue::None,
    };
    let specs = SpecList::new(vec![by_id], vec![]).unwrap();

    let plan = plan_for(&specs, serde_json::json!({"filters": {"id": 3}}));
    let record = execute_one(&plan, &source()).unwrap().unwrap();
    assert_eq!(ids(&record), vec![3]);

    let plan = plan_for(&specs, serde_json::json!({"filters": {"id": 99}}));
    assert!(execute_one(&plan, &source()).unwrap().is_none());
}

#[test]
fn test_rows_serialize_with_joined_columns() {
    let specs = SpecList::new(vec![region_name_spec()], vec![newest_sort()]).unwrap();
    let plan = plan_for(&specs, serde_json::json!({"filters": {"region_name": "east"}}));

    let frame = execute(&plan, &source()).unwrap();
    let rows = frame_to_json_rows(&frame).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 2);
    assert_eq!(rows[0]["name_customer"], "bob");
    assert_eq!(rows[0]["name_customer_region"], "east");
}
