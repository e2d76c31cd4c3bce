//! Set compilation inside relation scopes.
//!
//! `include` and `lookup` entries can carry their own set shorthand next
//! to a nested scope filter. [`ScopeRewriter`] walks those arrays and
//! compiles each shorthand into its entry's scope with the same compiler
//! and sanitizer used for top-level filters, so relation-traversal
//! queries get identical normalization. Shorthand keys are consumed by
//! the rewrite; the storage layer only ever sees plain scope filters.
//!
//! ```
//! use setra_filter::{Lookup, ScopeRewriter, Set, SetCompiler};
//!
//! let compiler = SetCompiler::new();
//! let lookups = vec![Lookup::new("parent").with_set(Set::new().condition("publics"))];
//! let rewritten = ScopeRewriter::new(&compiler).rewrite_lookups(lookups);
//! assert!(rewritten[0].set.is_none());
//! assert!(rewritten[0].scope.is_some());
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;
use tracing::trace;

use crate::compiler::SetCompiler;
use crate::filter::Filter;
use crate::predicate::Where;
use crate::sanitize::sanitize_filter;
use crate::set::Set;
use crate::value::Value;

/// Recursion guard for caller-supplied scope nesting; deeper levels pass
/// through unrewritten.
const MAX_DEPTH: usize = 64;

/// One `include` directive: traverse a relation, optionally filtering the
/// related records (`set`/`scope`) and the through-model rows
/// (`setThrough`/`whereThrough`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inclusion {
    /// Name of the relation to traverse.
    pub relation: SmolStr,
    /// Set shorthand to compile into `scope`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<Set>,
    /// Set shorthand to compile into `whereThrough`.
    #[serde(rename = "setThrough", skip_serializing_if = "Option::is_none")]
    pub set_through: Option<Set>,
    /// Predicate applied to the through model of a many-to-many relation.
    #[serde(rename = "whereThrough", skip_serializing_if = "Option::is_none")]
    pub where_through: Option<Where>,
    /// Nested filter applied to the related records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Box<Filter>>,
}

impl Inclusion {
    /// An inclusion of the named relation with no scope.
    pub fn new(relation: impl Into<SmolStr>) -> Self {
        Self {
            relation: relation.into(),
            set: None,
            set_through: None,
            where_through: None,
            scope: None,
        }
    }

    /// Attach a set shorthand to compile into the scope.
    pub fn with_set(mut self, set: Set) -> Self {
        self.set = Some(set);
        self
    }

    /// Attach a set shorthand for the through model.
    pub fn with_set_through(mut self, set: Set) -> Self {
        self.set_through = Some(set);
        self
    }

    /// Attach a through-model predicate.
    pub fn with_where_through(mut self, where_through: Where) -> Self {
        self.where_through = Some(where_through);
        self
    }

    /// Attach a nested scope filter.
    pub fn with_scope(mut self, scope: Filter) -> Self {
        self.scope = Some(Box::new(scope));
        self
    }

    /// Lenient decode: a bare string is a relation name, an object maps
    /// its known keys, anything else is not an inclusion.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Inclusion::new(name)),
            Value::Object(map) => {
                let mut inc = Inclusion::new("");
                for (key, value) in map {
                    match key.as_str() {
                        "relation" => {
                            if let Some(name) = value.as_str() {
                                inc.relation = name.into();
                            }
                        }
                        "set" => inc.set = Some(Set::from_value(value)),
                        "setThrough" => inc.set_through = Some(Set::from_value(value)),
                        "whereThrough" => inc.where_through = Some(Where::from_value(value)),
                        "scope" => inc.scope = Some(Box::new(Filter::from_value(value))),
                        _ => {}
                    }
                }
                Some(inc)
            }
            _ => None,
        }
    }

    /// Decode an `include` member: a single entry or an array of entries.
    /// Entries that are not objects or strings are dropped.
    pub fn list_from_value(value: Value) -> Option<Vec<Self>> {
        list_from_value(value, Inclusion::from_value)
    }
}

/// One `lookup` directive: resolve the records referenced by a property,
/// optionally filtered by a nested scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookup {
    /// Name of the referencing property.
    pub prop: SmolStr,
    /// Set shorthand to compile into `scope`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<Set>,
    /// Nested filter applied to the referenced records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Box<Filter>>,
}

impl Lookup {
    /// A lookup of the named property with no scope.
    pub fn new(prop: impl Into<SmolStr>) -> Self {
        Self {
            prop: prop.into(),
            set: None,
            scope: None,
        }
    }

    /// Attach a set shorthand to compile into the scope.
    pub fn with_set(mut self, set: Set) -> Self {
        self.set = Some(set);
        self
    }

    /// Attach a nested scope filter.
    pub fn with_scope(mut self, scope: Filter) -> Self {
        self.scope = Some(Box::new(scope));
        self
    }

    /// Lenient decode, mirroring [`Inclusion::from_value`].
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(prop) => Some(Lookup::new(prop)),
            Value::Object(map) => {
                let mut lookup = Lookup::new("");
                for (key, value) in map {
                    match key.as_str() {
                        "prop" => {
                            if let Some(name) = value.as_str() {
                                lookup.prop = name.into();
                            }
                        }
                        "set" => lookup.set = Some(Set::from_value(value)),
                        "scope" => lookup.scope = Some(Box::new(Filter::from_value(value))),
                        _ => {}
                    }
                }
                Some(lookup)
            }
            _ => None,
        }
    }

    /// Decode a `lookup` member: a single entry or an array of entries.
    pub fn list_from_value(value: Value) -> Option<Vec<Self>> {
        list_from_value(value, Lookup::from_value)
    }
}

fn list_from_value<T>(value: Value, entry: fn(Value) -> Option<T>) -> Option<Vec<T>> {
    match value {
        Value::List(items) => Some(items.into_iter().filter_map(entry).collect()),
        value @ (Value::Object(_) | Value::String(_)) => entry(value).map(|e| vec![e]),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Inclusion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Inclusion::from_value(value)
            .ok_or_else(|| serde::de::Error::custom("expected an inclusion object or relation name"))
    }
}

impl<'de> Deserialize<'de> for Lookup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Lookup::from_value(value)
            .ok_or_else(|| serde::de::Error::custom("expected a lookup object or property name"))
    }
}

/// Compiles set shorthands carried by `include`/`lookup` entries into
/// their scopes, recursively.
///
/// Each compiled scope is run through [`sanitize_filter`] so querystring
/// artifacts inside it are normalized exactly as at the top level.
/// Entries without a shorthand pass through with their scope intact,
/// though nested entries inside that scope are still rewritten.
#[derive(Debug, Clone, Copy)]
pub struct ScopeRewriter<'a> {
    compiler: &'a SetCompiler,
}

impl<'a> ScopeRewriter<'a> {
    /// A rewriter that compiles scope shorthands with `compiler`.
    pub fn new(compiler: &'a SetCompiler) -> Self {
        Self { compiler }
    }

    /// Rewrite every `include` and `lookup` entry of a filter. The
    /// filter's own `where` and shape members are untouched.
    pub fn rewrite_filter(&self, filter: Filter) -> Filter {
        self.rewrite_filter_at(filter, 0)
    }

    /// Rewrite a list of inclusion entries.
    pub fn rewrite_inclusions(&self, entries: Vec<Inclusion>) -> Vec<Inclusion> {
        self.rewrite_inclusions_at(entries, 0)
    }

    /// Rewrite a list of lookup entries.
    pub fn rewrite_lookups(&self, entries: Vec<Lookup>) -> Vec<Lookup> {
        self.rewrite_lookups_at(entries, 0)
    }

    fn rewrite_filter_at(&self, mut filter: Filter, depth: usize) -> Filter {
        if depth > MAX_DEPTH {
            return filter;
        }
        filter.include = filter
            .include
            .map(|entries| self.rewrite_inclusions_at(entries, depth));
        filter.lookup = filter
            .lookup
            .map(|entries| self.rewrite_lookups_at(entries, depth));
        filter
    }

    fn rewrite_inclusions_at(&self, entries: Vec<Inclusion>, depth: usize) -> Vec<Inclusion> {
        entries
            .into_iter()
            .map(|inc| self.rewrite_inclusion(inc, depth))
            .collect()
    }

    fn rewrite_lookups_at(&self, entries: Vec<Lookup>, depth: usize) -> Vec<Lookup> {
        entries
            .into_iter()
            .map(|lookup| self.rewrite_lookup(lookup, depth))
            .collect()
    }

    fn rewrite_inclusion(&self, mut inc: Inclusion, depth: usize) -> Inclusion {
        if let Some(set) = inc.set.take() {
            trace!(relation = %inc.relation, "compiling set into inclusion scope");
            let scope = inc.scope.take().map(|s| *s).unwrap_or_default();
            inc.scope = Some(Box::new(sanitize_filter(self.compiler.compile(&set, scope))));
        }
        if let Some(set) = inc.set_through.take() {
            trace!(relation = %inc.relation, "compiling set into through predicate");
            let mut seed = Filter::new();
            seed.where_clause = inc.where_through.take();
            inc.where_through = sanitize_filter(self.compiler.compile(&set, seed)).where_clause;
        }
        inc.scope = inc
            .scope
            .map(|s| Box::new(self.rewrite_filter_at(*s, depth + 1)));
        inc
    }

    fn rewrite_lookup(&self, mut lookup: Lookup, depth: usize) -> Lookup {
        if let Some(set) = lookup.set.take() {
            trace!(prop = %lookup.prop, "compiling set into lookup scope");
            let scope = lookup.scope.take().map(|s| *s).unwrap_or_default();
            lookup.scope = Some(Box::new(sanitize_filter(self.compiler.compile(&set, scope))));
        }
        lookup.scope = lookup
            .scope
            .map(|s| Box::new(self.rewrite_filter_at(*s, depth + 1)));
        lookup
    }
}
