//! Fuzz target for the querystring decoder.
//!
//! This target feeds arbitrary strings to `parse_query` to find crashes
//! and panics.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_decode_query
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use setra_qs::parse_query;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // The decoder should never panic, only return errors
        if let Ok(params) = parse_query(input) {
            // The DSL accessors are lenient and must not panic either
            let _ = params.set();
            let _ = params.filter();
        }
    }
});
