//! # setra-qs
//!
//! Bracket-notation querystring decoder for the Setra query DSL.
//!
//! REST callers deliver sets and filters as querystrings like
//! `?set[actives]=&filter[where][name]=foo&filter[limit]=10`. This crate
//! decodes that notation into the loosely typed value trees that
//! `setra-filter` consumes, without imposing any typing of its own:
//! every leaf arrives as a string, exactly as the sanitizer expects.
//!
//! ## Decoding
//!
//! ```rust
//! use setra_qs::parse_query;
//!
//! let params = parse_query("filter[where][name]=foo&filter[limit]=10").unwrap();
//! let filter = params.filter();
//! assert_eq!(filter.limit, Some(10));
//! ```
//!
//! One-shot helpers skip the intermediate [`QueryParams`]:
//!
//! ```rust
//! use setra_qs::{decode_filter, decode_set};
//!
//! let set = decode_set("set[owners]=[u1][g1]").unwrap();
//! assert_eq!(set.len(), 1);
//!
//! let filter = decode_filter("filter[skip]=4").unwrap();
//! assert_eq!(filter.skip, Some(4));
//! ```
//!
//! ## Pipeline
//!
//! Decoded values feed straight into the compiler and sanitizer:
//!
//! ```rust
//! use setra_filter::{sanitize_filter, ScopeRewriter, SetCompiler};
//! use setra_qs::parse_query;
//!
//! let params = parse_query("set[publics]=&filter[limit]=10").unwrap();
//! let compiler = SetCompiler::new();
//!
//! let filter = compiler.compile(&params.set(), params.filter());
//! let filter = ScopeRewriter::new(&compiler).rewrite_filter(filter);
//! let filter = sanitize_filter(filter);
//!
//! assert_eq!(filter.limit, Some(10));
//! assert!(filter.where_clause.is_some());
//! ```

pub mod parser;

pub use parser::{QsError, QueryParams, parse_query};

use setra_filter::{Filter, Set};

/// Decode the `set` root of a querystring. Absence decodes to the empty
/// set.
pub fn decode_set(query: &str) -> Result<Set, QsError> {
    Ok(parse_query(query)?.set())
}

/// Decode the `filter` root of a querystring. Absence decodes to the
/// empty filter.
pub fn decode_filter(query: &str) -> Result<Filter, QsError> {
    Ok(parse_query(query)?.filter())
}
