//! In-memory execution of query plans over Polars frames.
//!
//! The interpretation engine stops at an immutable [`QueryPlan`]; this crate
//! is the collaborator that runs one. Joined relations become left joins
//! with alias-suffixed columns, predicates and order terms address those
//! suffixed columns by binding depth.

use std::collections::HashMap;

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use queryspec_core::model::{CompareOp, ScalarValue, SortDirection};
use queryspec_core::plan::{BindingEntry, QueryPlan};
use queryspec_core::PageInfo;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("no data source registered for schema '{0}'")]
    MissingSource(String),

    #[error("plan references binding depth {depth} but the table has {joined} entries")]
    MissingBinding { depth: usize, joined: usize },

    #[error("set operator on field '{field}' expects a list value")]
    ExpectedList { field: String },

    #[error("list value used with a non-set operator on field '{field}'")]
    UnexpectedList { field: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Supplies the frame backing each schema of a plan.
pub trait DataSource {
    fn frame(&self, schema: &str) -> Result<LazyFrame, ExecuteError>;
}

/// A data source over pre-built frames, one per schema.
#[derive(Debug, Clone, Default)]
pub struct FrameSource {
    frames: HashMap<String, DataFrame>,
}

impl FrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: impl Into<String>, frame: DataFrame) {
        self.frames.insert(schema.into(), frame);
    }
}

impl DataSource for FrameSource {
    fn frame(&self, schema: &str) -> Result<LazyFrame, ExecuteError> {
        self.frames
            .get(schema)
            .cloned()
            .map(DataFrame::lazy)
            .ok_or_else(|| ExecuteError::MissingSource(schema.to_string()))
    }
}

/// Run a plan to completion: joins, predicates, ordering.
pub fn execute(plan: &QueryPlan, source: &impl DataSource) -> Result<DataFrame, ExecuteError> {
    let mut working = source.frame(&plan.base_schema)?;

    for entry in plan.bindings.entries() {
        working = apply_join(plan, working, entry, source)?;
        debug!(alias = %entry.alias, schema = %entry.schema, "join applied");
    }

    for predicate in &plan.predicates {
        let column = plan_column(plan, predicate.depth, &predicate.field)?;
        working = working.filter(predicate_expr(column, predicate.op, &predicate.value, &predicate.field)?);
    }

    if !plan.order.is_empty() {
        working = apply_order(plan, working)?;
    }

    working.collect().map_err(ExecuteError::from)
}

/// Run a plan and slice one page out of the ordered result.
pub fn execute_page(
    plan: &QueryPlan,
    source: &impl DataSource,
    limit: u64,
    offset: u64,
) -> Result<(DataFrame, PageInfo), ExecuteError> {
    let full = execute(plan, source)?;
    let total_count = full.height() as u64;
    let page = full.slice(offset as i64, limit as usize);
    Ok((page, PageInfo::compute(limit, offset, total_count)))
}

/// Run a plan and keep only the first record, if any.
pub fn execute_one(
    plan: &QueryPlan,
    source: &impl DataSource,
) -> Result<Option<DataFrame>, ExecuteError> {
    let full = execute(plan, source)?;
    if full.height() == 0 {
        Ok(None)
    } else {
        Ok(Some(full.slice(0, 1)))
    }
}

/// Convert a result frame into JSON row objects for the response envelope.
pub fn frame_to_json_rows(frame: &DataFrame) -> Result<Vec<serde_json::Value>, ExecuteError> {
    let columns = frame.get_columns();
    (0..frame.height())
        .map(|row| {
            let mut object = serde_json::Map::new();
            for column in columns {
                let value = column.get(row)?;
                object.insert(column.name().to_string(), any_value_to_json(&value));
            }
            Ok(serde_json::Value::Object(object))
        })
        .collect()
}

fn any_value_to_json(value: &AnyValue) -> serde_json::Value {
    match value {
        AnyValue::Null => serde_json::Value::Null,
        AnyValue::Boolean(flag) => serde_json::json!(flag),
        AnyValue::String(text) => serde_json::json!(text),
        AnyValue::StringOwned(text) => serde_json::json!(text.as_str()),
        AnyValue::Int8(n) => serde_json::json!(n),
        AnyValue::Int16(n) => serde_json::json!(n),
        AnyValue::Int32(n) => serde_json::json!(n),
        AnyValue::Int64(n) => serde_json::json!(n),
        AnyValue::UInt8(n) => serde_json::json!(n),
        AnyValue::UInt16(n) => serde_json::json!(n),
        AnyValue::UInt32(n) => serde_json::json!(n),
        AnyValue::UInt64(n) => serde_json::json!(n),
        AnyValue::Float32(n) => serde_json::json!(n),
        AnyValue::Float64(n) => serde_json::json!(n),
        other => serde_json::Value::String(format!("{other}")),
    }
}

/// Left-join one binding entry onto the working frame, suffixing every
/// joined column with the entry's alias.
fn apply_join(
    plan: &QueryPlan,
    working: LazyFrame,
    entry: &BindingEntry,
    source: &impl DataSource,
) -> Result<LazyFrame, ExecuteError> {
    let join_lf = source.frame(&entry.schema)?;
    let schema = join_lf.clone().collect_schema()?;
    let original: Vec<String> = schema.iter_names().map(|name| name.to_string()).collect();
    let renamed: Vec<String> = original
        .iter()
        .map(|column| format!("{column}_{}", entry.alias))
        .collect();
    let join_lf = join_lf.rename(
        original.iter().map(String::as_str),
        renamed.iter().map(String::as_str),
        true,
    );

    let left_key = plan_column(plan, entry.parent_depth, &entry.owner_key)?;
    let right_key = format!("{}_{}", entry.related_key, entry.alias);

    // Keep the right key column: a later hop may use it as its owner key.
    Ok(working.join(
        join_lf,
        [col(left_key.as_str())],
        [col(right_key.as_str())],
        JoinArgs::new(JoinType::Left).with_coalesce(JoinCoalesce::KeepColumns),
    ))
}

/// The physical column a depth/field pair addresses: bare on the base
/// relation, alias-suffixed on a joined one.
fn plan_column(plan: &QueryPlan, depth: usize, field: &str) -> Result<String, ExecuteError> {
    if depth == 0 {
        return Ok(field.to_string());
    }
    plan.bindings
        .entry(depth)
        .map(|entry| format!("{field}_{}", entry.alias))
        .ok_or(ExecuteError::MissingBinding {
            depth,
            joined: plan.bindings.len(),
        })
}

fn predicate_expr(
    column: String,
    op: CompareOp,
    value: &ScalarValue,
    field: &str,
) -> Result<Expr, ExecuteError> {
    let column = col(column.as_str());
    let expr = match op {
        CompareOp::Eq => column.eq(literal_expr(value, field)?),
        CompareOp::NotEq => column.neq(literal_expr(value, field)?),
        CompareOp::Gt => column.gt(literal_expr(value, field)?),
        CompareOp::Lt => column.lt(literal_expr(value, field)?),
        CompareOp::Gte => column.gt_eq(literal_expr(value, field)?),
        CompareOp::Lte => column.lt_eq(literal_expr(value, field)?),
        CompareOp::In => set_membership(column, value, false, field)?,
        CompareOp::NotIn => set_membership(column, value, true, field)?,
        CompareOp::IsNil => column.is_null(),
        CompareOp::NotNil => column.is_not_null(),
    };
    Ok(expr)
}

fn literal_expr(value: &ScalarValue, field: &str) -> Result<Expr, ExecuteError> {
    match value {
        ScalarValue::Null => Ok(lit(NULL)),
        ScalarValue::Bool(flag) => Ok(lit(*flag)),
        ScalarValue::Int(integer) => Ok(lit(*integer)),
        ScalarValue::Float(float) => Ok(lit(*float)),
        ScalarValue::String(text) => Ok(lit(text.clone())),
        ScalarValue::Date(date) => Ok(lit(*date)),
        ScalarValue::Timestamp(timestamp) => Ok(lit(timestamp.naive_utc())),
        ScalarValue::List(_) => Err(ExecuteError::UnexpectedList {
            field: field.to_string(),
        }),
    }
}

/// Set membership as an equality fold, so no dedicated membership kernel is
/// needed. An empty set matches nothing (or everything, negated).
fn set_membership(
    column: Expr,
    value: &ScalarValue,
    negated: bool,
    field: &str,
) -> Result<Expr, ExecuteError> {
    let ScalarValue::List(items) = value else {
        return Err(ExecuteError::ExpectedList {
            field: field.to_string(),
        });
    };

    let terms = items
        .iter()
        .map(|item| {
            literal_expr(item, field).map(|literal| {
                if negated {
                    column.clone().neq(literal)
                } else {
                    column.clone().eq(literal)
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(terms
        .into_iter()
        .reduce(|left, right| if negated { left.and(right) } else { left.or(right) })
        .unwrap_or_else(|| lit(negated)))
}

fn apply_order(plan: &QueryPlan, working: LazyFrame) -> Result<LazyFrame, ExecuteError> {
    let mut exprs = Vec::with_capacity(plan.order.len());
    let mut descending = Vec::with_capacity(plan.order.len());
    for term in &plan.order {
        exprs.push(col(plan_column(plan, term.depth, &term.field)?.as_str()));
        descending.push(term.direction == SortDirection::Desc);
    }
    Ok(working.sort_by_exprs(
        exprs,
        SortMultipleOptions::default()
            .with_order_descending_multi(descending)
            .with_nulls_last(true)
            .with_maintain_order(true),
    ))
}
