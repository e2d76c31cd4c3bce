//! Fuzz target for filter decoding, scope rewriting, and sanitizing.
//!
//! This target runs the whole filter normalization pipeline over filters
//! decoded from arbitrary JSON. None of the stages may panic, whatever
//! the shape of the input.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_sanitize_filter
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use setra_filter::{Filter, ScopeRewriter, SetCompiler, sanitize_filter};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(input) {
            let filter = Filter::from_json(value);
            let compiler = SetCompiler::new();
            let rewritten = ScopeRewriter::new(&compiler).rewrite_filter(filter);
            let _ = serde_json::to_string(&sanitize_filter(rewritten));
        }
    }
});
