//! Predicate trees: the normalized `where` structure handed to storage.
//!
//! A [`Where`] models a JSON predicate object. Sibling entries are
//! conjunctive, mirroring the wire form where an object carries several
//! field keys at once. The `and`/`or` keys carry arrays of nested
//! predicates and are kept as arrays even when they hold a single
//! element; the compiler never collapses or re-nests combinators.

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::DecodeError;
use crate::value::Value;

/// The condition attached to a single field entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// Direct equality: `{field: value}`.
    Value(Value),
    /// Operator map: `{field: {op: value, ...}}`.
    Ops(IndexMap<SmolStr, Value>),
}

/// One entry of a predicate object.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereEntry {
    /// A field condition.
    Cond {
        /// Field name the condition applies to.
        field: SmolStr,
        /// The condition payload.
        cond: Cond,
    },
    /// Conjunction of nested predicates: `{"and": [...]}`.
    And(Vec<Where>),
    /// Disjunction of nested predicates: `{"or": [...]}`.
    Or(Vec<Where>),
}

/// A predicate tree in the storage dialect.
///
/// An empty `Where` is the always-true predicate; it serializes as `{}`
/// and disappears when merged into other predicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Where(Vec<WhereEntry>);

impl Where {
    /// Create an empty (always-true) predicate.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Check if this predicate is empty (always true).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the entries of this predicate.
    pub fn entries(&self) -> &[WhereEntry] {
        &self.0
    }

    /// Create a direct field-equality predicate: `{field: value}`.
    pub fn field(field: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        Self(vec![WhereEntry::Cond {
            field: field.into(),
            cond: Cond::Value(value.into()),
        }])
    }

    /// Create a single-operator predicate: `{field: {op: value}}`.
    pub fn op(
        field: impl Into<SmolStr>,
        op: impl Into<SmolStr>,
        value: impl Into<Value>,
    ) -> Self {
        let mut ops = IndexMap::new();
        ops.insert(op.into(), value.into());
        Self(vec![WhereEntry::Cond {
            field: field.into(),
            cond: Cond::Ops(ops),
        }])
    }

    /// Shorthand for `{field: {neq: value}}`.
    pub fn neq(field: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        Self::op(field, crate::fields::ops::NEQ, value)
    }

    /// Shorthand for `{field: {gt: value}}`.
    pub fn gt(field: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        Self::op(field, crate::fields::ops::GT, value)
    }

    /// Shorthand for `{field: {lt: value}}`.
    pub fn lt(field: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        Self::op(field, crate::fields::ops::LT, value)
    }

    /// Shorthand for `{field: {between: [lo, hi]}}`.
    pub fn between(
        field: impl Into<SmolStr>,
        lo: impl Into<Value>,
        hi: impl Into<Value>,
    ) -> Self {
        Self::op(
            field,
            crate::fields::ops::BETWEEN,
            Value::List(vec![lo.into(), hi.into()]),
        )
    }

    /// Shorthand for `{field: {inq: [values...]}}`.
    pub fn in_list<V: Into<Value>>(
        field: impl Into<SmolStr>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::op(
            field,
            crate::fields::ops::INQ,
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Add a sibling field-equality entry to this predicate.
    ///
    /// Siblings are conjunctive: `Where::field("a", 1).and_field("b", 2)`
    /// serializes as `{"a": 1, "b": 2}`.
    pub fn and_field(mut self, field: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.0.push(WhereEntry::Cond {
            field: field.into(),
            cond: Cond::Value(value.into()),
        });
        self
    }

    /// Create an `and` combinator over the given predicates.
    ///
    /// Always-true children are dropped. The array form is preserved even
    /// for a single surviving child; if nothing survives the result is the
    /// always-true predicate.
    pub fn and(children: impl IntoIterator<Item = Where>) -> Self {
        let children: Vec<_> = children.into_iter().filter(|w| !w.is_empty()).collect();
        if children.is_empty() {
            Self::new()
        } else {
            Self(vec![WhereEntry::And(children)])
        }
    }

    /// Create an `or` combinator over the given predicates.
    ///
    /// An always-true child makes the whole disjunction always true, so the
    /// result collapses to the empty predicate. The array form is preserved
    /// otherwise, even for a single child.
    pub fn or(children: impl IntoIterator<Item = Where>) -> Self {
        let mut out = Vec::new();
        for child in children {
            if child.is_empty() {
                return Self::new();
            }
            out.push(child);
        }
        if out.is_empty() {
            Self::new()
        } else {
            Self(vec![WhereEntry::Or(out)])
        }
    }

    /// Combine with another predicate using AND.
    ///
    /// If this predicate is already a single `and` node the other predicate
    /// is appended to its array.
    pub fn and_then(self, other: Where) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        match self.into_single_and() {
            Ok(mut children) => {
                children.push(other);
                Self(vec![WhereEntry::And(children)])
            }
            Err(this) => Self(vec![WhereEntry::And(vec![this, other])]),
        }
    }

    /// Combine with another predicate using OR.
    pub fn or_else(self, other: Where) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::new();
        }
        match self.into_single_or() {
            Ok(mut children) => {
                children.push(other);
                Self(vec![WhereEntry::Or(children)])
            }
            Err(this) => Self(vec![WhereEntry::Or(vec![this, other])]),
        }
    }

    fn into_single_and(mut self) -> Result<Vec<Where>, Where> {
        if self.0.len() == 1 {
            match self.0.pop() {
                Some(WhereEntry::And(children)) => Ok(children),
                Some(entry) => {
                    self.0.push(entry);
                    Err(self)
                }
                None => Err(self),
            }
        } else {
            Err(self)
        }
    }

    fn into_single_or(mut self) -> Result<Vec<Where>, Where> {
        if self.0.len() == 1 {
            match self.0.pop() {
                Some(WhereEntry::Or(children)) => Ok(children),
                Some(entry) => {
                    self.0.push(entry);
                    Err(self)
                }
                None => Err(self),
            }
        } else {
            Err(self)
        }
    }

    /// Decode a predicate from a loosely typed value. Never fails.
    ///
    /// Non-object input decodes to the empty predicate. `and`/`or` keys
    /// are recognized as combinators only when they carry arrays; any
    /// other key becomes a field condition.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                let entries = map
                    .into_iter()
                    .map(|(key, value)| match (key.as_str(), value) {
                        ("and", Value::List(items)) => {
                            WhereEntry::And(items.into_iter().map(Where::from_value).collect())
                        }
                        ("or", Value::List(items)) => {
                            WhereEntry::Or(items.into_iter().map(Where::from_value).collect())
                        }
                        (_, Value::Object(ops)) => WhereEntry::Cond {
                            field: key,
                            cond: Cond::Ops(ops),
                        },
                        (_, value) => WhereEntry::Cond {
                            field: key,
                            cond: Cond::Value(value),
                        },
                    })
                    .collect();
                Self(entries)
            }
            _ => Self::new(),
        }
    }

    /// Decode a predicate from a JSON value. Never fails.
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::from_value(value.into())
    }

    /// Decode a predicate from JSON text.
    ///
    /// Only JSON syntax errors are reported; any well-formed document
    /// decodes leniently.
    pub fn from_json_str(s: &str) -> Result<Self, DecodeError> {
        Ok(Self::from_value(serde_json::from_str::<Value>(s)?))
    }

    pub(crate) fn from_entries(entries: Vec<WhereEntry>) -> Self {
        Self(entries)
    }

    pub(crate) fn into_entries(self) -> Vec<WhereEntry> {
        self.0
    }
}

impl Serialize for Where {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            match entry {
                WhereEntry::Cond { field, cond } => match cond {
                    Cond::Value(v) => map.serialize_entry(field.as_str(), v)?,
                    Cond::Ops(ops) => map.serialize_entry(field.as_str(), ops)?,
                },
                WhereEntry::And(children) => map.serialize_entry("and", children)?,
                WhereEntry::Or(children) => map.serialize_entry("or", children)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Where {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Where::from_value(Value::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(w: &Where) -> serde_json::Value {
        serde_json::to_value(w).unwrap()
    }

    // ========== Construction ==========

    #[test]
    fn test_field_equality() {
        let w = Where::field("name", "foo");
        assert_eq!(to_json(&w), json!({"name": "foo"}));
    }

    #[test]
    fn test_operator_map() {
        let w = Where::gt("age", 18);
        assert_eq!(to_json(&w), json!({"age": {"gt": 18}}));
    }

    #[test]
    fn test_between() {
        let w = Where::between("score", 1, 10);
        assert_eq!(to_json(&w), json!({"score": {"between": [1, 10]}}));
    }

    #[test]
    fn test_in_list() {
        let w = Where::in_list("id", ["a", "b"]);
        assert_eq!(to_json(&w), json!({"id": {"inq": ["a", "b"]}}));
    }

    #[test]
    fn test_sibling_fields_are_one_object() {
        let w = Where::field("a", 1).and_field("b", 2);
        assert_eq!(to_json(&w), json!({"a": 1, "b": 2}));
    }

    // ========== Combinators ==========

    #[test]
    fn test_and_keeps_singleton_array() {
        let w = Where::and([Where::field("a", 1)]);
        assert_eq!(to_json(&w), json!({"and": [{"a": 1}]}));
    }

    #[test]
    fn test_and_drops_always_true_children() {
        let w = Where::and([Where::new(), Where::field("a", 1), Where::new()]);
        assert_eq!(to_json(&w), json!({"and": [{"a": 1}]}));
    }

    #[test]
    fn test_and_of_nothing_is_always_true() {
        let w = Where::and([Where::new(), Where::new()]);
        assert!(w.is_empty());
    }

    #[test]
    fn test_or_short_circuits_on_always_true_child() {
        let w = Where::or([Where::field("a", 1), Where::new()]);
        assert!(w.is_empty());
    }

    #[test]
    fn test_or_keeps_array() {
        let w = Where::or([Where::field("a", 1), Where::field("b", 2)]);
        assert_eq!(to_json(&w), json!({"or": [{"a": 1}, {"b": 2}]}));
    }

    #[test]
    fn test_and_then_appends_to_existing_and() {
        let w = Where::and([Where::field("a", 1), Where::field("b", 2)])
            .and_then(Where::field("c", 3));
        assert_eq!(
            to_json(&w),
            json!({"and": [{"a": 1}, {"b": 2}, {"c": 3}]})
        );
    }

    #[test]
    fn test_and_then_wraps_non_and() {
        let w = Where::field("a", 1).and_then(Where::field("b", 2));
        assert_eq!(to_json(&w), json!({"and": [{"a": 1}, {"b": 2}]}));
    }

    #[test]
    fn test_and_then_with_empty_sides() {
        let w = Where::new().and_then(Where::field("a", 1));
        assert_eq!(to_json(&w), json!({"a": 1}));

        let w = Where::field("a", 1).and_then(Where::new());
        assert_eq!(to_json(&w), json!({"a": 1}));
    }

    #[test]
    fn test_or_else_merges() {
        let w = Where::or([Where::field("a", 1), Where::field("b", 2)])
            .or_else(Where::field("c", 3));
        assert_eq!(to_json(&w), json!({"or": [{"a": 1}, {"b": 2}, {"c": 3}]}));
    }

    // ========== Decoding ==========

    #[test]
    fn test_from_json_preserves_sibling_shape() {
        let w = Where::from_json(json!({"x": "null", "y": {"and": [{"z": "null"}]}}));
        assert_eq!(w.entries().len(), 2);
        // y's value object is an operator map, not a combinator
        assert!(matches!(
            &w.entries()[1],
            WhereEntry::Cond { cond: Cond::Ops(_), .. }
        ));
        assert_eq!(
            to_json(&w),
            json!({"x": "null", "y": {"and": [{"z": "null"}]}})
        );
    }

    #[test]
    fn test_from_json_combinators() {
        let w = Where::from_json(json!({"or": [{"a": 1}, {"b": {"gt": 2}}]}));
        assert!(matches!(w.entries()[0], WhereEntry::Or(_)));
        assert_eq!(to_json(&w), json!({"or": [{"a": 1}, {"b": {"gt": 2}}]}));
    }

    #[test]
    fn test_from_json_combinator_key_with_scalar_is_a_field() {
        let w = Where::from_json(json!({"and": "oops"}));
        assert!(matches!(w.entries()[0], WhereEntry::Cond { .. }));
        assert_eq!(to_json(&w), json!({"and": "oops"}));
    }

    #[test]
    fn test_from_json_non_object_is_empty() {
        assert!(Where::from_json(json!("nope")).is_empty());
        assert!(Where::from_json(json!(null)).is_empty());
        assert!(Where::from_json(json!([1, 2])).is_empty());
    }

    #[test]
    fn test_from_json_str_round_trip() {
        let w = Where::from_json_str(r#"{"a": {"inq": [1, 2]}, "and": [{"b": null}]}"#).unwrap();
        assert_eq!(
            to_json(&w),
            json!({"a": {"inq": [1, 2]}, "and": [{"b": null}]})
        );
    }

    #[test]
    fn test_from_json_str_rejects_bad_json() {
        assert!(Where::from_json_str("{nope").is_err());
    }

    #[test]
    fn test_deserialize_via_serde() {
        let w: Where = serde_json::from_str(r#"{"a": 1}"#).unwrap();
        assert_eq!(w, Where::field("a", 1));
    }

    #[test]
    fn test_empty_serializes_as_empty_object() {
        assert_eq!(to_json(&Where::new()), json!({}));
    }
}
