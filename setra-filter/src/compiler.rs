//! The set-expression compiler.
//!
//! [`SetCompiler`] walks a [`Set`] tree, resolves each condition through
//! the built-in clauses, and merges the result into a caller-supplied
//! [`Filter`]. Compilation never fails: unknown conditions are no-ops and
//! untrusted ownership payloads fail closed.
//!
//! ```
//! use setra_filter::{Set, Filter, SetCompiler};
//!
//! let set = Set::new().condition("publics");
//! let filter = SetCompiler::new().compile(&set, Filter::new());
//! assert!(filter.where_clause.is_some());
//! ```

use chrono::{DateTime, Utc};
use tracing::{trace, warn};

use crate::clauses::{self, OwnerScope};
use crate::filter::Filter;
use crate::predicate::Where;
use crate::set::{Set, SetEntry};

/// Recursion guard for caller-supplied set trees.
const MAX_DEPTH: usize = 64;

/// Compiles set expressions into filter predicates.
///
/// A compiler is stateless apart from its construction context: an
/// optional [`OwnerScope`] consulted when ownership conditions carry no
/// parameter, and an optional pinned clock for deterministic output.
#[derive(Debug, Clone, Default)]
pub struct SetCompiler {
    scope: Option<OwnerScope>,
    now: Option<DateTime<Utc>>,
}

impl SetCompiler {
    /// Create a compiler with no ownership scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler that resolves parameterless ownership conditions
    /// against the given scope.
    pub fn with_scope(scope: OwnerScope) -> Self {
        Self {
            scope: Some(scope),
            now: None,
        }
    }

    /// Pin the clock used by time-based clauses.
    ///
    /// Without a pinned clock every condition samples the current time as
    /// it compiles.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Compile a set against an existing filter.
    ///
    /// The compiled predicate is AND-ed with any non-empty `where` the
    /// filter already carries; every other member passes through
    /// untouched. Compiling an empty set returns the filter unchanged.
    pub fn compile(&self, set: &Set, mut filter: Filter) -> Filter {
        if set.is_empty() {
            return filter;
        }
        trace!(conditions = set.len(), "compiling set expression");
        let compiled = self.compile_set(set, 0);
        filter.where_clause = match filter.where_clause.take() {
            Some(existing) if !existing.is_empty() => Some(existing.and_then(compiled)),
            prior => {
                if compiled.is_empty() {
                    prior
                } else {
                    Some(compiled)
                }
            }
        };
        filter
    }

    /// Compile just the predicate for a set, with nothing to merge into.
    pub fn compile_where(&self, set: &Set) -> Where {
        self.compile_set(set, 0)
    }

    fn compile_set(&self, set: &Set, depth: usize) -> Where {
        if depth > MAX_DEPTH {
            warn!(depth, "set expression too deep, matching nothing");
            return clauses::impossible();
        }
        let mut parts: Vec<Where> = Vec::with_capacity(set.len());
        for entry in set.entries() {
            let part = match entry {
                SetEntry::Condition { name, param } => self.clause(name, param.as_deref()),
                SetEntry::All(sets) => {
                    Where::and(sets.iter().map(|s| self.compile_set(s, depth + 1)))
                }
                SetEntry::Any(sets) => {
                    Where::or(sets.iter().map(|s| self.compile_set(s, depth + 1)))
                }
            };
            if !part.is_empty() {
                parts.push(part);
            }
        }
        // Sibling entries are conjunctive; a lone result stays bare.
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Where::and(parts)
        }
    }

    fn clause(&self, name: &str, param: Option<&str>) -> Where {
        trace!(condition = name, "compiling set clause");
        match name {
            "publics" => clauses::publics(),
            "actives" => clauses::actives(self.clock()),
            "inactives" => clauses::inactives(self.clock()),
            "pendings" => clauses::pendings(),
            "owners" | "my" => clauses::owners(param, self.scope.as_ref()),
            "day" => clauses::recent(self.clock(), 1),
            "week" => clauses::recent(self.clock(), 7),
            "month" => clauses::recent(self.clock(), 30),
            "prod" => clauses::prod(param, self.scope.as_ref(), self.clock()),
            _ => {
                trace!(condition = name, "ignoring unknown set condition");
                Where::new()
            }
        }
    }

    fn clock(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compiler() -> SetCompiler {
        SetCompiler::new().with_now(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())
    }

    fn where_json(filter: &Filter) -> serde_json::Value {
        serde_json::to_value(filter.where_clause.as_ref().unwrap()).unwrap()
    }

    // ========== No-op guarantees ==========

    #[test]
    fn test_empty_set_returns_filter_unchanged() {
        let filter = Filter::from_json(json!({
            "where": {"name": "foo"},
            "limit": 10,
            "order": "name ASC",
        }));
        let out = compiler().compile(&Set::new(), filter.clone());
        assert_eq!(out, filter);
    }

    #[test]
    fn test_unknown_condition_is_a_no_op() {
        let set = Set::new().condition("bogus");
        let out = compiler().compile(&set, Filter::new());
        assert_eq!(out, Filter::new());

        let filter = Filter::from_json(json!({"where": {"a": 1}}));
        let out = compiler().compile(&set, filter.clone());
        assert_eq!(out, filter);
    }

    #[test]
    fn test_empty_existing_where_is_kept_when_nothing_compiles() {
        let filter = Filter::from_json(json!({"where": {}}));
        let out = compiler().compile(&Set::new().condition("bogus"), filter.clone());
        assert_eq!(out, filter);
    }

    // ========== Leaf and sibling compilation ==========

    #[test]
    fn test_single_condition_compiles_bare() {
        let out = compiler().compile(&Set::new().condition("publics"), Filter::new());
        assert_eq!(where_json(&out), json!({"visibility": "public"}));
    }

    #[test]
    fn test_sibling_conditions_are_conjunctive() {
        let set = Set::new().condition("publics").condition("pendings");
        let out = compiler().compile(&set, Filter::new());
        assert_eq!(
            where_json(&out),
            json!({"and": [
                {"visibility": "public"},
                {"validFrom": null},
            ]})
        );
    }

    #[test]
    fn test_sibling_merge_equivalent_to_separate_compiles() {
        let c = compiler();
        let merged = c.compile_where(&Set::new().condition("publics").condition("inactives"));
        let separate = Where::and([
            c.compile_where(&Set::new().condition("publics")),
            c.compile_where(&Set::new().condition("inactives")),
        ]);
        assert_eq!(merged, separate);
    }

    #[test]
    fn test_unknown_sibling_drops_out() {
        let set = Set::new().condition("bogus").condition("publics");
        let out = compiler().compile(&set, Filter::new());
        assert_eq!(where_json(&out), json!({"visibility": "public"}));
    }

    // ========== Combinators ==========

    #[test]
    fn test_and_combinator_keeps_singleton_array() {
        let set = Set::new().all([Set::new().condition("publics")]);
        let out = compiler().compile(&set, Filter::new());
        assert_eq!(where_json(&out), json!({"and": [{"visibility": "public"}]}));
    }

    #[test]
    fn test_or_combinator() {
        let set = Set::new().any([
            Set::new().condition("publics"),
            Set::new().condition("pendings"),
        ]);
        let out = compiler().compile(&set, Filter::new());
        assert_eq!(
            where_json(&out),
            json!({"or": [
                {"visibility": "public"},
                {"validFrom": null},
            ]})
        );
    }

    #[test]
    fn test_or_with_unknown_child_is_always_true() {
        // true OR publics = true, which as a predicate is the no-op.
        let set = Set::new().any([
            Set::new().condition("bogus"),
            Set::new().condition("publics"),
        ]);
        let out = compiler().compile(&set, Filter::new());
        assert_eq!(out.where_clause, None);
    }

    #[test]
    fn test_nested_combinators() {
        let set = Set::from_json(json!({
            "and": [
                {"publics": ""},
                {"or": [{"pendings": ""}, {"owners": "[u1]"}]},
            ]
        }));
        let out = compiler().compile(&set, Filter::new());
        assert_eq!(
            where_json(&out),
            json!({"and": [
                {"visibility": "public"},
                {"or": [
                    {"validFrom": null},
                    {"ownerUsers": {"inq": ["u1"]}},
                ]},
            ]})
        );
    }

    // ========== Merging ==========

    #[test]
    fn test_merge_with_existing_where() {
        let filter = Filter::from_json(json!({"where": {"name": "foo"}, "limit": 5}));
        let out = compiler().compile(&Set::new().condition("publics"), filter);
        assert_eq!(
            where_json(&out),
            json!({"and": [
                {"name": "foo"},
                {"visibility": "public"},
            ]})
        );
        assert_eq!(out.limit, Some(5));
    }

    #[test]
    fn test_merge_replaces_empty_existing_where() {
        let filter = Filter::from_json(json!({"where": {}}));
        let out = compiler().compile(&Set::new().condition("publics"), filter);
        assert_eq!(where_json(&out), json!({"visibility": "public"}));
    }

    #[test]
    fn test_other_members_pass_through() {
        let filter = Filter::from_json(json!({
            "fields": ["name"],
            "order": ["name ASC"],
            "limit": 3,
            "skip": 9,
        }));
        let out = compiler().compile(&Set::new().condition("publics"), filter.clone());
        assert_eq!(out.fields, filter.fields);
        assert_eq!(out.order, filter.order);
        assert_eq!(out.limit, filter.limit);
        assert_eq!(out.skip, filter.skip);
    }

    #[test]
    fn test_recompiling_double_ands() {
        // Redundant but harmless, matching the documented guarantee.
        let c = compiler();
        let set = Set::new().condition("publics");
        let once = c.compile(&set, Filter::new());
        let twice = c.compile(&set, once);
        assert_eq!(
            where_json(&twice),
            json!({"and": [
                {"visibility": "public"},
                {"visibility": "public"},
            ]})
        );
    }

    // ========== Ownership context ==========

    #[test]
    fn test_my_is_an_owners_alias() {
        let c = compiler();
        let via_my = c.compile_where(&Set::new().condition_with("my", "[u1][g1]"));
        let via_owners = c.compile_where(&Set::new().condition_with("owners", "[u1][g1]"));
        assert_eq!(via_my, via_owners);
    }

    #[test]
    fn test_scope_used_when_param_missing() {
        let scope = OwnerScope::new().with_user("u1");
        let c = SetCompiler::with_scope(scope);
        let w = c.compile_where(&Set::new().condition("owners"));
        assert_eq!(
            serde_json::to_value(&w).unwrap(),
            json!({"ownerUsers": {"inq": ["u1"]}})
        );
    }

    #[test]
    fn test_empty_param_fails_closed_even_with_scope() {
        let scope = OwnerScope::new().with_user("u1");
        let c = SetCompiler::with_scope(scope);
        let w = c.compile_where(&Set::new().condition_with("owners", ""));
        assert_eq!(serde_json::to_value(&w).unwrap(), json!({"kind": false}));
    }

    // ========== Determinism and hardening ==========

    #[test]
    fn test_pinned_clock_is_deterministic() {
        let c = compiler();
        let set = Set::new().condition("actives").condition("week");
        assert_eq!(c.compile_where(&set), c.compile_where(&set));
    }

    #[test]
    fn test_pathological_nesting_fails_closed() {
        let mut set = Set::new().condition("publics");
        for _ in 0..(MAX_DEPTH + 8) {
            set = Set::new().all([set]);
        }
        let w = compiler().compile_where(&set);
        assert!(!w.is_empty());
        let text = serde_json::to_string(&w).unwrap();
        assert!(text.contains(r#"{"kind":false}"#));
        assert!(!text.contains("visibility"));
    }
}
