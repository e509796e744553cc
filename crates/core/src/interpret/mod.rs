//! Two-phase filter and sort interpretation.
//!
//! Explicit request values resolve first, then defaults for the keys the
//! request left out entirely. Presence in the request is the sole phase
//! discriminator: an explicit null is handled by the explicit phase (and
//! possibly skipped), never by the default phase.

use tracing::debug;

use crate::error::{BuildError, Result};
use crate::model::schema::SchemaDescriptor;
use crate::model::{
    DefaultValue, FilterSpec, ScalarValue, SchemaRegistry, SortDirection, SpecList,
};
use crate::plan::{build_order_term, build_predicate, BindingTable, OrderTerm, Predicate, QueryPlan};
use crate::request::ListRequest;
use crate::resolver::{resolve_path, target_schema};

/// Supplies values for computed filter defaults.
///
/// A spec's `computed` default names a capability and operation; the
/// interpreter invokes this seam and treats the returned value exactly like
/// a literal default. Failures abort the build.
pub trait DefaultValueSource {
    fn resolve(
        &self,
        capability: &str,
        operation: &str,
        args: &[ScalarValue],
    ) -> anyhow::Result<ScalarValue>;
}

/// Source for endpoints whose specs carry no computed defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoComputedDefaults;

impl DefaultValueSource for NoComputedDefaults {
    fn resolve(
        &self,
        capability: &str,
        operation: &str,
        _args: &[ScalarValue],
    ) -> anyhow::Result<ScalarValue> {
        anyhow::bail!("no computed default source registered (wanted {capability}.{operation})")
    }
}

/// Interpret one request against an endpoint's spec list and produce the
/// query plan the executor runs.
pub fn interpret<D>(
    registry: &SchemaRegistry,
    base_schema: &str,
    specs: &SpecList,
    request: &ListRequest,
    defaults: &D,
) -> Result<QueryPlan>
where
    D: DefaultValueSource,
{
    interpret_seeded(
        registry,
        base_schema,
        specs,
        request,
        defaults,
        BindingTable::new(),
    )
}

/// Like [`interpret`], with joins pre-seeded from a preload tree so filter
/// and sort paths reuse joins the preload walker will make anyway.
pub fn interpret_with_preloads<D>(
    registry: &SchemaRegistry,
    base_schema: &str,
    specs: &SpecList,
    request: &ListRequest,
    defaults: &D,
    preloads: &[crate::preload::PreloadSpec],
) -> Result<QueryPlan>
where
    D: DefaultValueSource,
{
    let base = registry.get(base_schema)?;
    let mut bindings = BindingTable::new();
    crate::preload::seed_joins(registry, base, preloads, &mut bindings)?;
    interpret_seeded(registry, base_schema, specs, request, defaults, bindings)
}

fn interpret_seeded<D>(
    registry: &SchemaRegistry,
    base_schema: &str,
    specs: &SpecList,
    request: &ListRequest,
    defaults: &D,
    mut bindings: BindingTable,
) -> Result<QueryPlan>
where
    D: DefaultValueSource,
{
    let base = registry.get(base_schema)?;
    let mut predicates = Vec::new();

    // Explicit phase: keys present in the request, spec-list order.
    for spec in specs.filters() {
        if let Some(value) = request.filters.get(&spec.key) {
            apply_filter(registry, base, &mut bindings, &mut predicates, spec, value)?;
        }
    }

    // Default phase: keys absent from the request (not merely null).
    for spec in specs.filters() {
        if request.filters.contains_key(&spec.key) {
            continue;
        }
        match &spec.default {
            DefaultValue::None => {
                if spec.allow_nil {
                    apply_filter(
                        registry,
                        base,
                        &mut bindings,
                        &mut predicates,
                        spec,
                        &ScalarValue::Null,
                    )?;
                }
            }
            DefaultValue::Literal(value) => {
                apply_filter(registry, base, &mut bindings, &mut predicates, spec, value)?;
            }
            DefaultValue::Computed {
                capability,
                operation,
                args,
            } => {
                let value = defaults.resolve(capability, operation, args).map_err(
                    |error| BuildError::ComputedDefaultFailure {
                        capability: capability.clone(),
                        operation: operation.clone(),
                        detail: error.to_string(),
                    },
                )?;
                apply_filter(registry, base, &mut bindings, &mut predicates, spec, &value)?;
            }
        }
    }

    let order = resolve_sort(registry, base, &mut bindings, specs, &request.sort)?;

    debug!(
        base = base_schema,
        joins = bindings.len(),
        predicates = predicates.len(),
        order_terms = order.len(),
        "query plan assembled"
    );

    Ok(QueryPlan::new(base_schema, bindings, predicates, order))
}

/// Apply one filter spec with a driving value (explicit or defaulted).
///
/// An explicit null only applies when the spec allows nil, and then through
/// the truthy/base branch of a conditional pair; otherwise the key is
/// skipped entirely.
fn apply_filter(
    registry: &SchemaRegistry,
    base: &SchemaDescriptor,
    bindings: &mut BindingTable,
    predicates: &mut Vec<Predicate>,
    spec: &FilterSpec,
    value: &ScalarValue,
) -> Result<()> {
    if value.is_null() && !spec.allow_nil {
        return Ok(());
    }

    let op = if value.is_null() {
        spec.operator.base()
    } else {
        spec.operator.select(value)
    };

    let steps = resolve_path(registry, base, &spec.path)?;
    let target = target_schema(registry, base, &steps)?;
    if target.field(&spec.field).is_none() {
        return Err(BuildError::UnknownField {
            field: spec.field.clone(),
            schema: target.name.clone(),
        });
    }

    let depth = bindings.ensure_joins(&steps)?;
    predicates.push(build_predicate(depth, &spec.field, op, value.clone())?);
    Ok(())
}

fn resolve_sort(
    registry: &SchemaRegistry,
    base: &SchemaDescriptor,
    bindings: &mut BindingTable,
    specs: &SpecList,
    tokens: &[String],
) -> Result<Vec<OrderTerm>> {
    let mut explicit = Vec::new();
    for token in tokens {
        let (key, direction) = parse_sort_token(token)?;
        // Tokens for keys outside the spec set are discarded, not errors.
        let Some(spec) = specs.sort(key) else {
            debug!(token = %token, "sort token discarded, key not in spec set");
            continue;
        };
        explicit.push(order_term_for(registry, base, bindings, spec, direction)?);
    }

    if !explicit.is_empty() {
        return Ok(explicit);
    }

    // No valid explicit sort: every default-flagged spec applies, in
    // spec-list order, with its own declared direction.
    specs
        .sorts()
        .iter()
        .filter(|spec| spec.is_default)
        .map(|spec| order_term_for(registry, base, bindings, spec, spec.direction))
        .collect()
}

fn order_term_for(
    registry: &SchemaRegistry,
    base: &SchemaDescriptor,
    bindings: &mut BindingTable,
    spec: &crate::model::SortSpec,
    direction: SortDirection,
) -> Result<OrderTerm> {
    let steps = resolve_path(registry, base, &spec.path)?;
    let target = target_schema(registry, base, &steps)?;
    if target.field(&spec.field).is_none() {
        return Err(BuildError::UnknownField {
            field: spec.field.clone(),
            schema: target.name.clone(),
        });
    }
    let depth = bindings.ensure_joins(&steps)?;
    build_order_term(depth, &spec.field, direction)
}

/// Parse a `key[:asc|desc]` sort token. The direction defaults to
/// ascending; anything else in the direction slot is malformed syntax.
fn parse_sort_token(token: &str) -> Result<(&str, SortDirection)> {
    let (key, direction) = match token.split_once(':') {
        None => (token, SortDirection::Asc),
        Some((key, "asc")) => (key, SortDirection::Asc),
        Some((key, "desc")) => (key, SortDirection::Desc),
        Some((_, other)) => {
            return Err(BuildError::MalformedSortToken {
                token: token.to_string(),
                reason: format!("unknown direction '{other}'"),
            });
        }
    };
    if key.is_empty() {
        return Err(BuildError::MalformedSortToken {
            token: token.to_string(),
            reason: "empty key".to_string(),
        });
    }
    Ok((key, direction))
}
