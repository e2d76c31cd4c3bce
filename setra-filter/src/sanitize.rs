//! Normalization of querystring-decoded filters.
//!
//! Querystrings deliver every scalar as a string. The sanitizer rewrites
//! an assembled [`Filter`] into its typed form: `"true"`/`"false"` become
//! booleans inside `fields`, the literal `"null"` becomes null inside
//! `where`, and operator objects carrying a `type` hint get their operand
//! values coerced. All transforms are pure: callers reassign the result.
//!
//! ```
//! use setra_filter::{sanitize_filter, Filter};
//! use serde_json::json;
//!
//! let raw = Filter::from_json(json!({"where": {"rating": {"eq": "6", "type": "number"}}}));
//! let clean = sanitize_filter(raw);
//! assert_eq!(
//!     serde_json::to_value(&clean).unwrap(),
//!     json!({"where": {"rating": {"eq": 6}}}),
//! );
//! ```

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::filter::{FieldSpec, Filter};
use crate::predicate::{Cond, Where, WhereEntry};
use crate::scopes::{Inclusion, Lookup};
use crate::value::Value;

/// Recursion guard for caller-supplied trees; deeper levels pass through
/// unsanitized rather than recursing further.
const MAX_DEPTH: usize = 64;

/// The operator-object key carrying an explicit coercion hint.
const TYPE_HINT: &str = "type";

/// Sanitize a whole filter: its `where`, its `fields`, and recursively
/// every `include`/`lookup` scope. Never fails; an empty filter is
/// returned unchanged.
pub fn sanitize_filter(filter: Filter) -> Filter {
    sanitize_filter_at(filter, 0)
}

/// Sanitize a predicate tree: `"null"` strings become null and `type`
/// hints are applied, recursively at any depth.
pub fn sanitize_where(where_clause: Where) -> Where {
    sanitize_where_at(where_clause, 0)
}

/// Coerce `"true"`/`"false"` values of a visibility map to booleans.
/// Only exact matches convert; everything else passes through.
pub fn sanitize_fields(fields: FieldSpec) -> FieldSpec {
    match fields {
        FieldSpec::Visibility(map) => FieldSpec::Visibility(
            map.into_iter().map(|(k, v)| (k, field_flag(v))).collect(),
        ),
        names => names,
    }
}

fn sanitize_filter_at(mut filter: Filter, depth: usize) -> Filter {
    if depth > MAX_DEPTH {
        return filter;
    }
    filter.where_clause = filter.where_clause.map(|w| sanitize_where_at(w, depth));
    filter.fields = filter.fields.map(sanitize_fields);
    filter.include = filter.include.map(|entries| {
        entries
            .into_iter()
            .map(|inc| sanitize_inclusion(inc, depth + 1))
            .collect()
    });
    filter.lookup = filter.lookup.map(|entries| {
        entries
            .into_iter()
            .map(|l| sanitize_lookup(l, depth + 1))
            .collect()
    });
    filter
}

fn sanitize_inclusion(mut inc: Inclusion, depth: usize) -> Inclusion {
    inc.where_through = inc.where_through.map(|w| sanitize_where_at(w, depth));
    inc.scope = inc.scope.map(|s| Box::new(sanitize_filter_at(*s, depth)));
    inc
}

fn sanitize_lookup(mut lookup: Lookup, depth: usize) -> Lookup {
    lookup.scope = lookup.scope.map(|s| Box::new(sanitize_filter_at(*s, depth)));
    lookup
}

fn sanitize_where_at(where_clause: Where, depth: usize) -> Where {
    if depth > MAX_DEPTH {
        return where_clause;
    }
    let entries = where_clause
        .into_entries()
        .into_iter()
        .map(|entry| match entry {
            WhereEntry::Cond { field, cond } => WhereEntry::Cond {
                field,
                cond: match cond {
                    Cond::Value(v) => Cond::Value(sanitize_value(v, depth + 1)),
                    Cond::Ops(map) => Cond::Ops(sanitize_op_map(map, depth + 1)),
                },
            },
            WhereEntry::And(children) => WhereEntry::And(
                children
                    .into_iter()
                    .map(|c| sanitize_where_at(c, depth + 1))
                    .collect(),
            ),
            WhereEntry::Or(children) => WhereEntry::Or(
                children
                    .into_iter()
                    .map(|c| sanitize_where_at(c, depth + 1))
                    .collect(),
            ),
        })
        .collect();
    Where::from_entries(entries)
}

/// Rewrite one value inside `where`: `"null"` strings become null, lists
/// walk element-wise, and objects are treated as operator maps.
fn sanitize_value(value: Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return value;
    }
    match value {
        Value::String(s) if s == "null" => Value::Null,
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|v| sanitize_value(v, depth + 1))
                .collect(),
        ),
        Value::Object(map) => Value::Object(sanitize_op_map(map, depth + 1)),
        value => value,
    }
}

/// Apply a `type` hint if present, then recurse into the remaining values.
fn sanitize_op_map(map: IndexMap<SmolStr, Value>, depth: usize) -> IndexMap<SmolStr, Value> {
    let map = if map.contains_key(TYPE_HINT) {
        apply_type_hint(map)
    } else {
        map
    };
    map.into_iter()
        .map(|(k, v)| (k, sanitize_value(v, depth)))
        .collect()
}

/// Consume the hint and coerce every other value in the operator object.
/// The hint key never survives into the output; an unrecognized hint
/// coerces nothing.
fn apply_type_hint(mut map: IndexMap<SmolStr, Value>) -> IndexMap<SmolStr, Value> {
    let hint = map.shift_remove(TYPE_HINT);
    let coerce: fn(Value) -> Value = match hint.as_ref().and_then(Value::as_str) {
        Some("number") => number,
        Some("boolean") => boolean,
        _ => return map,
    };
    map.into_iter()
        .map(|(k, v)| (k, elementwise(v, coerce)))
        .collect()
}

fn elementwise(value: Value, coerce: fn(Value) -> Value) -> Value {
    match value {
        Value::List(items) => Value::List(items.into_iter().map(coerce).collect()),
        value => coerce(value),
    }
}

/// Parse-or-leave numeric coercion: strings that read as integers become
/// integers, strings that read as finite floats become floats, everything
/// else is untouched.
fn number(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let text = s.trim();
            if let Ok(i) = text.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(f) = text.parse::<f64>() {
                if f.is_finite() {
                    Value::Float(f)
                } else {
                    Value::String(s)
                }
            } else {
                Value::String(s)
            }
        }
        value => value,
    }
}

/// Case-insensitive boolean coercion: `"true"` in any casing is true,
/// any other string is false, non-strings are untouched.
fn boolean(value: Value) -> Value {
    match value {
        Value::String(s) => Value::Bool(s.eq_ignore_ascii_case("true")),
        value => value,
    }
}

fn field_flag(value: Value) -> Value {
    match value.as_str() {
        Some("true") => Value::Bool(true),
        Some("false") => Value::Bool(false),
        _ => value,
    }
}
