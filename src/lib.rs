//! # Setra
//!
//! A composable query-set compiler: declarative set shorthands into
//! normalized storage filters.
//!
//! Setra provides:
//! - A querystring decoder for bracket notation (`?set[actives]=&filter[limit]=10`)
//! - Named set conditions (`actives`, `publics`, `owners[...]`) with `and`/`or` trees
//! - A recursive compiler from set trees to `where` predicate trees
//! - A sanitizer that fixes querystring typing artifacts before storage
//!
//! ## Quick Start
//!
//! ```rust
//! use setra::prelude::*;
//!
//! fn main() -> Result<(), setra::QsError> {
//!     // As received by a REST handler:
//!     let query = "set[actives]=&filter[where][kind]=entity&filter[limit]=10";
//!
//!     let params = setra::qs::parse_query(query)?;
//!     let compiler = SetCompiler::new();
//!
//!     let filter = compiler.compile(&params.set(), params.filter());
//!     let filter = ScopeRewriter::new(&compiler).rewrite_filter(filter);
//!     let filter = sanitize_filter(filter);
//!
//!     // `where` now holds the caller's predicate AND the actives window,
//!     // ready for the storage layer.
//!     assert_eq!(filter.limit, Some(10));
//!     assert!(filter.where_clause.is_some());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Set compilation, predicate trees, and filter sanitizing.
pub mod filter {
    pub use setra_filter::*;
}

/// Querystring decoding.
pub mod qs {
    pub use setra_qs::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use setra_filter::prelude::*;
    pub use setra_qs::{QueryParams, decode_filter, decode_set, parse_query};
}

// Re-export key types at the crate root
pub use filter::{Filter, Set, SetCompiler, Where};
pub use qs::{QsError, QueryParams};
