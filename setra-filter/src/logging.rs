//! Optional tracing-subscriber setup driven by environment variables.
//!
//! The compiler and rewriter emit `tracing` events (clause traces,
//! fail-closed warnings) regardless of this module; embedding
//! applications usually install their own subscriber and never call
//! anything here. For standalone use, the `tracing-subscriber` feature
//! enables [`init`], configured through:
//!
//! - `SETRA_DEBUG=true|1|yes` — turn on debug-level output
//! - `SETRA_LOG_LEVEL=trace|debug|info|warn|error` — exact level
//! - `SETRA_LOG_FORMAT=json|pretty|compact` — output format, json default
//!
//! Without the feature, [`init`] is a no-op and events go nowhere unless
//! the caller installs a subscriber.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// True when `SETRA_DEBUG` requests debug output.
#[inline]
pub fn is_debug_enabled() -> bool {
    matches!(
        env::var("SETRA_DEBUG").as_deref(),
        Ok(v) if v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("yes")
    )
}

/// The effective log level: `SETRA_LOG_LEVEL` when it names a level,
/// otherwise `debug` under `SETRA_DEBUG` and `warn` without it.
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("SETRA_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// The effective output format from `SETRA_LOG_FORMAT`; unknown values
/// fall back to `json`.
pub fn get_log_format() -> &'static str {
    match env::var("SETRA_LOG_FORMAT") {
        Ok(f) if f.eq_ignore_ascii_case("pretty") => "pretty",
        Ok(f) if f.eq_ignore_ascii_case("compact") => "compact",
        _ => "json",
    }
}

/// Install the subscriber once, if logging was requested.
///
/// Does nothing unless `SETRA_DEBUG` or `SETRA_LOG_LEVEL` is set, so a
/// library consumer that never opts in pays nothing. Repeated calls are
/// no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("SETRA_LOG_LEVEL").is_err() {
            return;
        }
        install_subscriber();
    });
}

#[cfg(feature = "tracing-subscriber")]
fn install_subscriber() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = get_log_level();
    let filter = EnvFilter::try_new(format!("setra_filter={level},setra_qs={level}"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match get_log_format() {
        "pretty" => registry.with(fmt::layer().pretty()).init(),
        "compact" => registry.with(fmt::layer().compact()).init(),
        _ => registry.with(fmt::layer().json()).init(),
    }

    tracing::info!(level, format = get_log_format(), "setra logging initialized");
}

#[cfg(not(feature = "tracing-subscriber"))]
fn install_subscriber() {}

/// [`init`] with an explicit level, overriding `SETRA_LOG_LEVEL`.
///
/// # Safety
///
/// Sets a process environment variable, which is unsound once other
/// threads are running. Call only during single-threaded startup.
pub fn init_with_level(level: &str) {
    // SAFETY: callers invoke this before spawning threads.
    unsafe {
        env::set_var("SETRA_LOG_LEVEL", level);
    }
    init();
}

/// [`init`] with `SETRA_DEBUG` forced on.
///
/// # Safety
///
/// Sets a process environment variable, which is unsound once other
/// threads are running. Call only during single-threaded startup.
pub fn init_debug() {
    // SAFETY: callers invoke this before spawning threads.
    unsafe {
        env::set_var("SETRA_DEBUG", "true");
    }
    init();
}

/// Debug-log only when `SETRA_DEBUG` is on, skipping argument evaluation
/// otherwise.
#[macro_export]
macro_rules! setra_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Trace-log only when `SETRA_DEBUG` is on.
#[macro_export]
macro_rules! setra_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}
