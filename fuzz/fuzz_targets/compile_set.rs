//! Fuzz target for set decoding and compilation.
//!
//! This target decodes arbitrary JSON into a set tree and compiles it,
//! checking the permissive-DSL contract: malformed input may compile to
//! an impossible or empty predicate but never to a panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_compile_set
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use setra_filter::{Filter, Set, SetCompiler};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(input) {
            let set = Set::from_json(value);
            let filter = SetCompiler::new().compile(&set, Filter::new());
            // Compiled output always serializes
            let _ = serde_json::to_string(&filter);
        }
    }
});
