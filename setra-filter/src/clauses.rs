//! Built-in set clauses: the named rules conditions resolve to.
//!
//! Each clause is a pure function from an optional parameter payload to a
//! predicate subtree. Clauses never fail: an `owners` payload that cannot
//! be parsed produces an [`impossible`] predicate so the caller matches
//! nothing rather than everything.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex_lite::Regex;
use smallvec::SmallVec;
use tracing::warn;

use crate::fields;
use crate::predicate::Where;
use crate::value::Value;

/// Owner/group payloads look like `[user1,user2][group1]`; the second
/// bracket pair is optional.
const OWNERS_PATTERN: &str = r"\[([^\]]*)\](?:\[([^\]]*)\])?";

type OwnerIds = SmallVec<[String; 4]>;

/// Explicit ownership context for the `owners`/`my`/`prod` clauses.
///
/// Callers that already know the requesting user's ids pass an
/// `OwnerScope` to the compiler; a condition parameter, when present,
/// always takes precedence over it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OwnerScope {
    users: Vec<String>,
    groups: Vec<String>,
}

impl OwnerScope {
    /// Create an empty scope (no users, no groups).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one user id.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.users.push(user.into());
        self
    }

    /// Add several user ids.
    pub fn with_users<S: Into<String>>(mut self, users: impl IntoIterator<Item = S>) -> Self {
        self.users.extend(users.into_iter().map(Into::into));
        self
    }

    /// Add one group id.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Add several group ids.
    pub fn with_groups<S: Into<String>>(mut self, groups: impl IntoIterator<Item = S>) -> Self {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// User ids in this scope.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Group ids in this scope.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Check if the scope carries neither users nor groups.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }
}

/// A predicate no record satisfies: `{kind: false}`.
///
/// The fail-closed fallback for ownership clauses with untrusted input.
pub fn impossible() -> Where {
    Where::field(fields::KIND, false)
}

/// Records visible to everyone: `{visibility: "public"}`.
pub fn publics() -> Where {
    Where::field(fields::VISIBILITY, fields::visibility::PUBLIC)
}

/// Records currently in their validity window.
///
/// `(validUntil IS NULL OR validUntil > now) AND validFrom != null AND
/// validFrom < now`.
pub fn actives(now: DateTime<Utc>) -> Where {
    let now = rfc3339(now);
    Where::and([
        Where::or([
            Where::field(fields::VALID_UNTIL, Value::Null),
            Where::gt(fields::VALID_UNTIL, now.clone()),
        ]),
        Where::neq(fields::VALID_FROM, Value::Null),
        Where::lt(fields::VALID_FROM, now),
    ])
}

/// Records whose validity window has closed.
pub fn inactives(now: DateTime<Utc>) -> Where {
    Where::and([
        Where::neq(fields::VALID_UNTIL, Value::Null),
        Where::lt(fields::VALID_UNTIL, rfc3339(now)),
    ])
}

/// Records not yet activated: `{validFrom: null}`.
pub fn pendings() -> Where {
    Where::field(fields::VALID_FROM, Value::Null)
}

/// Records created within the trailing window of `days` days.
pub fn recent(now: DateTime<Utc>, days: i64) -> Where {
    Where::between(
        fields::CREATED_AT,
        rfc3339(now - Duration::days(days)),
        rfc3339(now),
    )
}

/// Records owned by the given users or groups.
///
/// The parameter payload takes precedence over the scope. A payload that
/// does not match the `[users][groups]` form fails closed, as does a
/// missing payload when no scope was supplied. A payload that parses with
/// both lists empty selects records with zero owners and zero groups.
pub fn owners(param: Option<&str>, scope: Option<&OwnerScope>) -> Where {
    match param {
        Some(param) => match parse_owner_lists(param) {
            Some((users, groups)) => owner_predicate(&users, &groups),
            None => {
                warn!(param, "unparseable owners payload, matching nothing");
                impossible()
            }
        },
        None => match scope {
            Some(scope) => owner_predicate(scope.users(), scope.groups()),
            None => {
                warn!("owners clause without payload or scope, matching nothing");
                impossible()
            }
        },
    }
}

/// The production convenience set: everything a public caller may see.
///
/// `OR(AND(actives, publics), AND(owners, OR(actives, pendings)))`.
pub fn prod(param: Option<&str>, scope: Option<&OwnerScope>, now: DateTime<Utc>) -> Where {
    Where::or([
        Where::and([actives(now), publics()]),
        Where::and([
            owners(param, scope),
            Where::or([actives(now), pendings()]),
        ]),
    ])
}

fn owner_predicate(users: &[String], groups: &[String]) -> Where {
    let users_clause = || Where::in_list(fields::OWNER_USERS, users.iter().cloned());
    let groups_clause = || {
        Where::and([
            Where::in_list(fields::OWNER_GROUPS, groups.iter().cloned()),
            Where::neq(fields::VISIBILITY, fields::visibility::PRIVATE),
        ])
    };
    match (users.is_empty(), groups.is_empty()) {
        (false, false) => Where::or([users_clause(), groups_clause()]),
        (false, true) => users_clause(),
        (true, false) => groups_clause(),
        // Parsed but empty brackets: select unowned records.
        (true, true) => Where::field(fields::OWNER_USERS_COUNT, 0)
            .and_field(fields::OWNER_GROUPS_COUNT, 0),
    }
}

fn parse_owner_lists(param: &str) -> Option<(OwnerIds, OwnerIds)> {
    let caps = owners_pattern().captures(param)?;
    let users = split_ids(caps.get(1).map_or("", |m| m.as_str()));
    let groups = split_ids(caps.get(2).map_or("", |m| m.as_str()));
    Some((users, groups))
}

fn split_ids(csv: &str) -> OwnerIds {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn owners_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(OWNERS_PATTERN).unwrap())
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
