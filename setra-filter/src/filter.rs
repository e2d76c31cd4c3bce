//! The full query descriptor passed to the storage layer.
//!
//! A [`Filter`] bundles a predicate with shape and pagination options.
//! Every member is optional; the compiler only ever replaces `where` and
//! carries everything else through verbatim. Decoding is lenient: members
//! that cannot be read (a non-numeric `limit`, an unrecognized `fields`
//! payload) decode to `None` rather than failing, because filters arrive
//! from untrusted querystrings.

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::DecodeError;
use crate::predicate::Where;
use crate::scopes::{Inclusion, Lookup};
use crate::value::Value;

/// Field selection: either a list of names or a visibility map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldSpec {
    /// Select exactly the named fields: `["name", "kind"]`.
    Names(Vec<SmolStr>),
    /// Per-field visibility flags: `{"name": true, "secret": false}`.
    ///
    /// Values decoded from querystrings may arrive as the strings
    /// `"true"`/`"false"`; the sanitizer rewrites those to booleans.
    Visibility(IndexMap<SmolStr, Value>),
}

impl FieldSpec {
    /// Decode a field selection from a loosely typed value.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::Visibility(map)),
            Value::List(items) => Some(Self::Names(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(SmolStr::from))
                    .collect(),
            )),
            Value::String(s) => Some(Self::Names(vec![s])),
            _ => None,
        }
    }
}

/// Sort specification: one `"field direction"` string or several.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrderSpec {
    /// A single ordering, e.g. `"createdAt DESC"`.
    One(SmolStr),
    /// Several orderings applied in sequence.
    Many(Vec<SmolStr>),
}

impl OrderSpec {
    /// Decode a sort specification from a loosely typed value.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::One(s)),
            Value::List(items) => Some(Self::Many(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(SmolStr::from))
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl From<&str> for OrderSpec {
    fn from(s: &str) -> Self {
        Self::One(s.into())
    }
}

impl From<String> for OrderSpec {
    fn from(s: String) -> Self {
        Self::One(s.into())
    }
}

impl From<Vec<String>> for OrderSpec {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v.into_iter().map(SmolStr::from).collect())
    }
}

/// The query descriptor handed to the storage layer.
///
/// ```
/// use setra_filter::{Filter, Where};
///
/// let filter = Filter::new()
///     .with_where(Where::field("name", "foo"))
///     .with_limit(10);
/// assert_eq!(filter.limit, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Filter {
    /// The predicate tree. `None` and an empty predicate both mean
    /// "match everything".
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Where>,
    /// Field selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldSpec>,
    /// Sort order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSpec>,
    /// Maximum number of records to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Number of records to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    /// Relations to traverse and attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<Inclusion>>,
    /// Reverse lookups to resolve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<Vec<Lookup>>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if every member is unset.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Set the predicate.
    pub fn with_where(mut self, where_clause: Where) -> Self {
        self.where_clause = Some(where_clause);
        self
    }

    /// Set the field selection.
    pub fn with_fields(mut self, fields: FieldSpec) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Select exactly the named fields.
    pub fn select<S: Into<SmolStr>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(FieldSpec::Names(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the sort order.
    pub fn with_order(mut self, order: impl Into<OrderSpec>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Set the record limit.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of records to skip.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the relation inclusions.
    pub fn with_include(mut self, include: impl IntoIterator<Item = Inclusion>) -> Self {
        self.include = Some(include.into_iter().collect());
        self
    }

    /// Set the reverse lookups.
    pub fn with_lookup(mut self, lookup: impl IntoIterator<Item = Lookup>) -> Self {
        self.lookup = Some(lookup.into_iter().collect());
        self
    }

    /// Decode a filter from a loosely typed value. Never fails.
    ///
    /// `offset` is accepted as an alias for `skip` when `skip` is absent.
    /// Unknown members are dropped.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let mut filter = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "where" => filter.where_clause = Some(Where::from_value(value)),
                "fields" => filter.fields = FieldSpec::from_value(value),
                "order" => filter.order = OrderSpec::from_value(value),
                "limit" => filter.limit = permissive_u64(value),
                "skip" => filter.skip = permissive_u64(value),
                "offset" => {
                    if filter.skip.is_none() {
                        filter.skip = permissive_u64(value);
                    }
                }
                "include" => filter.include = Inclusion::list_from_value(value),
                "lookup" => filter.lookup = Lookup::list_from_value(value),
                _ => {}
            }
        }
        filter
    }

    /// Decode a filter from a JSON value. Never fails.
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::from_value(value.into())
    }

    /// Decode a filter from JSON text. Only JSON syntax errors are reported.
    pub fn from_json_str(s: &str) -> Result<Self, DecodeError> {
        Ok(Self::from_value(serde_json::from_str::<Value>(s)?))
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Filter::from_value(Value::deserialize(deserializer)?))
    }
}

/// Querystrings deliver numbers as strings; accept those and plain numbers,
/// and drop anything else (including negatives).
fn permissive_u64(value: Value) -> Option<u64> {
    match value {
        Value::Int(i) => u64::try_from(i).ok(),
        Value::Float(f) if f.is_finite() && f >= 0.0 => Some(f as u64),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_json_full_descriptor() {
        let filter = Filter::from_json(json!({
            "where": {"name": "foo"},
            "fields": ["name", "kind"],
            "order": "createdAt DESC",
            "limit": 10,
            "skip": 5,
        }));
        assert_eq!(filter.where_clause, Some(Where::field("name", "foo")));
        assert_eq!(
            filter.fields,
            Some(FieldSpec::Names(vec!["name".into(), "kind".into()]))
        );
        assert_eq!(filter.order, Some(OrderSpec::One("createdAt DESC".into())));
        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.skip, Some(5));
    }

    #[test]
    fn test_permissive_numeric_strings() {
        let filter = Filter::from_json(json!({"limit": "10", "skip": " 3 "}));
        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.skip, Some(3));
    }

    #[test]
    fn test_unusable_numbers_drop_out() {
        let filter = Filter::from_json(json!({"limit": -5, "skip": "abc"}));
        assert_eq!(filter.limit, None);
        assert_eq!(filter.skip, None);
    }

    #[test]
    fn test_offset_is_a_skip_alias() {
        let filter = Filter::from_json(json!({"offset": 7}));
        assert_eq!(filter.skip, Some(7));

        let filter = Filter::from_json(json!({"skip": 2, "offset": 7}));
        assert_eq!(filter.skip, Some(2));
    }

    #[test]
    fn test_fields_visibility_map() {
        let filter = Filter::from_json(json!({"fields": {"name": "true", "secret": "false"}}));
        let Some(FieldSpec::Visibility(map)) = filter.fields else {
            panic!("expected a visibility map");
        };
        assert_eq!(map.get("name"), Some(&Value::String("true".into())));
    }

    #[test]
    fn test_fields_single_name() {
        let filter = Filter::from_json(json!({"fields": "name"}));
        assert_eq!(filter.fields, Some(FieldSpec::Names(vec!["name".into()])));
    }

    #[test]
    fn test_order_list() {
        let filter = Filter::from_json(json!({"order": ["name ASC", "createdAt DESC"]}));
        assert_eq!(
            filter.order,
            Some(OrderSpec::Many(vec![
                "name ASC".into(),
                "createdAt DESC".into()
            ]))
        );
    }

    #[test]
    fn test_empty_where_is_preserved() {
        let filter = Filter::from_json(json!({"where": {}}));
        assert_eq!(filter.where_clause, Some(Where::new()));
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({"where": {}}));
    }

    #[test]
    fn test_non_object_decodes_empty() {
        assert!(Filter::from_json(json!("nope")).is_empty());
        assert!(Filter::from_json(json!(null)).is_empty());
    }

    #[test]
    fn test_unset_members_not_serialized() {
        let filter = Filter::new().with_limit(3);
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({"limit": 3}));
    }

    #[test]
    fn test_builder_round_trip() {
        let filter = Filter::new()
            .with_where(Where::gt("age", 21))
            .select(["name"])
            .with_order("name ASC")
            .with_limit(50)
            .with_skip(10);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            json!({
                "where": {"age": {"gt": 21}},
                "fields": ["name"],
                "order": "name ASC",
                "limit": 50,
                "skip": 10,
            })
        );
        assert_eq!(Filter::from_json(json), filter);
    }

    #[test]
    fn test_deserialize_via_serde() {
        let filter: Filter = serde_json::from_str(r#"{"limit": "25"}"#).unwrap();
        assert_eq!(filter.limit, Some(25));
    }
}
