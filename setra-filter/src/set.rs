//! Set expressions: the declarative query shorthand consumed by the compiler.
//!
//! A [`Set`] is a small serializable tree. Leaf entries name a registered
//! condition (`actives`, `owners`, ...) with an optional string parameter;
//! `and`/`or` entries nest arrays of further sets. Sibling entries of one
//! node are implicitly conjunctive. Sets are immutable input: the compiler
//! walks them without modification.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::DecodeError;
use crate::value::Value;

/// One entry of a set node.
#[derive(Debug, Clone, PartialEq)]
pub enum SetEntry {
    /// A named condition with an optional raw string parameter.
    Condition {
        /// Registered condition name (unknown names compile to no-ops).
        name: SmolStr,
        /// Raw parameter payload, e.g. `"[u1,u2][g1]"` for `owners`.
        param: Option<String>,
    },
    /// Conjunction of nested sets: `{"and": [...]}`.
    All(Vec<Set>),
    /// Disjunction of nested sets: `{"or": [...]}`.
    Any(Vec<Set>),
}

/// A set expression tree.
///
/// ```
/// use setra_filter::Set;
///
/// // ?set[actives]=&set[owners]=[u1][g1]
/// let set = Set::new()
///     .condition("actives")
///     .condition_with("owners", "[u1][g1]");
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Set(Vec<SetEntry>);

impl Set {
    /// Create an empty set. Compiling it is a no-op.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Check if this set has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries in this node.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the entries of this node.
    pub fn entries(&self) -> &[SetEntry] {
        &self.0
    }

    /// Add a parameterless condition entry.
    pub fn condition(mut self, name: impl Into<SmolStr>) -> Self {
        self.0.push(SetEntry::Condition {
            name: name.into(),
            param: None,
        });
        self
    }

    /// Add a condition entry carrying a raw string parameter.
    pub fn condition_with(
        mut self,
        name: impl Into<SmolStr>,
        param: impl Into<String>,
    ) -> Self {
        self.0.push(SetEntry::Condition {
            name: name.into(),
            param: Some(param.into()),
        });
        self
    }

    /// Add an `and` combinator over the given sets.
    pub fn all(mut self, sets: impl IntoIterator<Item = Set>) -> Self {
        self.0.push(SetEntry::All(sets.into_iter().collect()));
        self
    }

    /// Add an `or` combinator over the given sets.
    pub fn any(mut self, sets: impl IntoIterator<Item = Set>) -> Self {
        self.0.push(SetEntry::Any(sets.into_iter().collect()));
        self
    }

    /// Decode a set from a loosely typed value. Never fails.
    ///
    /// Non-object input decodes to the empty set. Scalar condition values
    /// become string parameters; `null` becomes a missing parameter;
    /// object or array payloads under a condition name are dropped.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                let entries = map
                    .into_iter()
                    .map(|(key, value)| match (key.as_str(), value) {
                        ("and", Value::List(items)) => {
                            SetEntry::All(items.into_iter().map(Set::from_value).collect())
                        }
                        ("or", Value::List(items)) => {
                            SetEntry::Any(items.into_iter().map(Set::from_value).collect())
                        }
                        (_, value) => SetEntry::Condition {
                            name: key,
                            param: param_from_value(value),
                        },
                    })
                    .collect();
                Self(entries)
            }
            _ => Self::new(),
        }
    }

    /// Decode a set from a JSON value. Never fails.
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::from_value(value.into())
    }

    /// Decode a set from JSON text. Only JSON syntax errors are reported.
    pub fn from_json_str(s: &str) -> Result<Self, DecodeError> {
        Ok(Self::from_value(serde_json::from_str::<Value>(s)?))
    }
}

/// Condition parameters arrive as strings from querystring decoding; other
/// scalars are stringified so `set[limit-like]=5` style input stays usable.
fn param_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Null | Value::List(_) | Value::Object(_) => None,
    }
}

impl Serialize for Set {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            match entry {
                SetEntry::Condition { name, param } => match param {
                    Some(p) => map.serialize_entry(name.as_str(), p)?,
                    None => map.serialize_entry(name.as_str(), &())?,
                },
                SetEntry::All(sets) => map.serialize_entry("and", sets)?,
                SetEntry::Any(sets) => map.serialize_entry("or", sets)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Set {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Set::from_value(Value::deserialize(deserializer)?))
    }
}
