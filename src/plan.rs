//! Schema-driven planning.
//!
//! Compares prior state with the proposed configuration attribute by
//! attribute and decides whether the change is a create, an in-place update,
//! a replacement or a delete.

use serde_json::{Map, Value};

use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` to `proposed`.
///
/// `prior` is `None` (or null) for a create; `proposed` is null for a
/// delete.
pub fn plan(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    let prior = prior.filter(|v| !v.is_null());
    match (prior, proposed) {
        (None, Value::Null) => PlanResult::no_change(Value::Null),
        (Some(prior), Value::Null) => plan_delete(prior),
        (None, proposed) => plan_create(schema, proposed),
        (Some(prior), proposed) => plan_update(schema, prior, proposed),
    }
}

fn attributes(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

fn plan_create(schema: &Schema, proposed: &Value) -> PlanResult {
    let mut planned = attributes(proposed);
    let mut changes = Vec::new();

    for (name, attr) in &schema.attributes {
        if attr.flags.is_computed_only() {
            // Unknown until the API answers.
            planned.insert(name.clone(), Value::Null);
            continue;
        }
        match planned.get(name) {
            Some(value) if !value.is_null() => changes.push(AttributeChange::added(name, value.clone())),
            _ => {},
        }
    }

    PlanResult::with_changes(Value::Object(planned), changes, false)
}

fn plan_update(schema: &Schema, prior: &Value, proposed: &Value) -> PlanResult {
    let prior = attributes(prior);
    let mut planned = attributes(proposed);

    for (name, attr) in &schema.attributes {
        if !attr.flags.computed {
            continue;
        }
        let unset = planned.get(name).map_or(true, Value::is_null);
        if unset {
            if let Some(value) = prior.get(name) {
                planned.insert(name.clone(), value.clone());
            }
        }
    }

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for (name, attr) in &schema.attributes {
        let before = prior.get(name).filter(|v| !v.is_null());
        let after = planned.get(name).filter(|v| !v.is_null());
        let change = match (before, after) {
            (Some(b), Some(a)) if b == a => None,
            (None, None) => None,
            (Some(b), Some(a)) => Some(AttributeChange::modified(name, b.clone(), a.clone())),
            (None, Some(a)) => Some(AttributeChange::added(name, a.clone())),
            (Some(b), None) => Some(AttributeChange::removed(name, b.clone())),
        };
        if let Some(change) = change {
            // Write-only values are missing from imported state; adopt them.
            requires_replace |= attr.force_new && before.is_some();
            changes.push(change);
        }
    }

    if changes.is_empty() {
        PlanResult::no_change(Value::Object(planned))
    } else {
        PlanResult::with_changes(Value::Object(planned), changes, requires_replace)
    }
}

fn plan_delete(prior: &Value) -> PlanResult {
    let changes = attributes(prior)
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| AttributeChange::removed(k, v))
        .collect();
    PlanResult::with_changes(Value::Null, changes, false)
}
