//! Internal helpers for input normalization and conversion.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Trim and NFC-normalize a required name; blank names are rejected.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.nfc().collect())
}

/// Parse a UUID read back from storage.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("{label} not exists")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_composes() {
        // "e" followed by a combining acute accent.
        let name = normalize_required_name("  Jose\u{0301} ", "participant").unwrap();
        assert_eq!(name, "Jos\u{00e9}");
    }

    #[test]
    fn blank_is_rejected() {
        let err = normalize_required_name(" \t ", "event").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput("event name must not be empty".to_string())
        );
    }
}
