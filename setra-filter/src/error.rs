//! Error types for strict decoding entry points.
//!
//! The compile and sanitize paths never fail: malformed set conditions
//! fail closed and unknown keys are ignored. Errors only arise when a
//! caller hands over text that is not JSON at all.

use thiserror::Error;

/// Errors produced when decoding filters, predicates, or sets from text.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload was not well-formed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err = DecodeError::from(err);
        assert!(err.to_string().starts_with("invalid JSON:"));
    }
}
