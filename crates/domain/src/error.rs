//! Errors raised by domain constructors and parsers.

use thiserror::Error;

/// Error from building or parsing a domain value.
///
/// Individual generated fields never produce these; they fall back to
/// defaults. A generated record that is not an object does.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A parameter or record broke an invariant.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A string did not name a known value.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = DomainError::validation("count must be at least 1");
        assert_eq!(err.to_string(), "Validation failed: count must be at least 1");
    }

    #[test]
    fn parse_error_display() {
        let err = DomainError::parse("Unknown ability: luck");
        assert_eq!(err.to_string(), "Parse error: Unknown ability: luck");
    }
}
