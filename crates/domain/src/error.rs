//! Unified error type for the domain layer
//!
//! The rule computations themselves never fail for well-typed input. Errors
//! only arise when text or stored documents are turned into domain values.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Stored document was written by a newer schema than this build understands
    #[error("Unsupported schema version {found} (latest supported is {supported})")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    /// Stored document could not be decoded
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if name.trim().is_empty() {
    ///     return Err(DomainError::validation("Realm name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_error_mentions_both_versions() {
        let err = DomainError::UnsupportedSchemaVersion {
            found: 9,
            supported: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn json_errors_become_malformed_documents() {
        let err: DomainError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, DomainError::MalformedDocument(_)));
    }
}
