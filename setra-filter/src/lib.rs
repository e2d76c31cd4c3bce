//! # setra-filter
//!
//! Set-expression compiler, filter sanitizer, and scope rewriter for the
//! Setra query DSL.
//!
//! This crate provides the core filter construction functionality, including:
//! - A compact declarative shorthand for common predicates (`Set`)
//! - Named clause builders (`actives`, `publics`, `owners`, time windows)
//! - Recursive compilation of set trees into `where` predicates
//! - Coercion of querystring artifacts (`"null"`, `"true"`, type hints)
//! - Rewriting of `include`/`lookup` relation scopes
//!
//! ## Sets
//!
//! Compile a set shorthand into a filter:
//!
//! ```rust
//! use setra_filter::{Filter, Set, SetCompiler};
//! use serde_json::json;
//!
//! // Decoded from `?set[publics]=&set[pendings]=`
//! let set = Set::from_json(json!({"publics": "", "pendings": ""}));
//!
//! let filter = SetCompiler::new().compile(&set, Filter::new());
//! assert_eq!(
//!     serde_json::to_value(&filter).unwrap(),
//!     json!({"where": {"and": [{"visibility": "public"}, {"validFrom": null}]}}),
//! );
//! ```
//!
//! Owner scoping takes the bracket-encoded parameter form:
//!
//! ```rust
//! use setra_filter::{Filter, Set, SetCompiler};
//! use serde_json::json;
//!
//! let set = Set::new().condition_with("owners", "[u1,u2][g1]");
//! let filter = SetCompiler::new().compile(&set, Filter::new());
//!
//! let or = &serde_json::to_value(&filter).unwrap()["where"]["or"];
//! assert_eq!(or[0], json!({"ownerUsers": {"inq": ["u1", "u2"]}}));
//! ```
//!
//! ## Sanitizing
//!
//! Normalize a querystring-decoded filter before handing it to storage:
//!
//! ```rust
//! use setra_filter::{sanitize_filter, Filter};
//! use serde_json::json;
//!
//! let raw = Filter::from_json(json!({
//!     "where": {"rating": {"eq": "6", "type": "number"}, "parent": "null"},
//!     "fields": {"name": "true"},
//! }));
//!
//! let clean = sanitize_filter(raw);
//! assert_eq!(
//!     serde_json::to_value(&clean).unwrap(),
//!     json!({
//!         "where": {"rating": {"eq": 6}, "parent": null},
//!         "fields": {"name": true},
//!     }),
//! );
//! ```
//!
//! ## Values
//!
//! Convert Rust types to predicate values:
//!
//! ```rust
//! use setra_filter::Value;
//!
//! // Integer values
//! let val: Value = 42.into();
//! assert!(matches!(val, Value::Int(42)));
//!
//! // String values
//! let val: Value = "hello".into();
//! assert!(matches!(val, Value::String(_)));
//!
//! // Boolean values
//! let val: Value = true.into();
//! assert!(matches!(val, Value::Bool(true)));
//!
//! // Null values
//! let val = Value::Null;
//! assert!(val.is_null());
//! ```
//!
//! ## Predicates
//!
//! Build `where` trees directly when no shorthand fits:
//!
//! ```rust
//! use setra_filter::Where;
//! use serde_json::json;
//!
//! let predicate = Where::or([
//!     Where::field("kind", "entity"),
//!     Where::gt("rating", 4).and_field("visibility", "public"),
//! ]);
//! assert_eq!(
//!     serde_json::to_value(&predicate).unwrap(),
//!     json!({"or": [
//!         {"kind": "entity"},
//!         {"rating": {"gt": 4}, "visibility": "public"},
//!     ]}),
//! );
//! ```

pub mod clauses;
pub mod compiler;
pub mod error;
pub mod fields;
pub mod filter;
pub mod logging;
pub mod predicate;
pub mod sanitize;
pub mod scopes;
pub mod set;
pub mod value;

pub use compiler::SetCompiler;
pub use error::DecodeError;
pub use filter::{FieldSpec, Filter, OrderSpec};
pub use predicate::{Cond, Where, WhereEntry};
pub use sanitize::{sanitize_fields, sanitize_filter, sanitize_where};
pub use scopes::{Inclusion, Lookup, ScopeRewriter};
pub use set::{Set, SetEntry};
pub use value::Value;

// Re-export clause builders
pub use clauses::{
    OwnerScope, actives, impossible, inactives, owners, pendings, prod, publics, recent,
};

// Re-export logging utilities
pub use logging::{
    get_log_format, get_log_level, init as init_logging, init_debug, init_with_level,
    is_debug_enabled,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::clauses::OwnerScope;
    pub use crate::compiler::SetCompiler;
    pub use crate::error::DecodeError;
    pub use crate::filter::{FieldSpec, Filter, OrderSpec};
    pub use crate::predicate::{Cond, Where, WhereEntry};
    pub use crate::sanitize::{sanitize_fields, sanitize_filter, sanitize_where};
    pub use crate::scopes::{Inclusion, Lookup, ScopeRewriter};
    pub use crate::set::{Set, SetEntry};
    pub use crate::value::Value;
}
