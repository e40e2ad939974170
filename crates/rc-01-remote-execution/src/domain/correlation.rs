//! Correlation token for matching an injection to its notification.
//!
//! Uses UUID v4 text. Uniqueness only has to hold among invocations that
//! are outstanding at the same time.

use std::fmt;
use uuid::Uuid;

/// Single-use key tying one injected payload to the envelope it emits.
///
/// Deliberately not `Clone`: the token is moved into the one listener that
/// waits for it, so two listeners can never share a token.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct CorrelationToken(String);

impl CorrelationToken {
    /// Generate a fresh token.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing token text.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Token text as embedded in payloads and envelopes.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tokens_differ() {
        let a = CorrelationToken::new();
        let b = CorrelationToken::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_display() {
        let token = CorrelationToken::new();
        assert_eq!(token.to_string().len(), 36); // UUID format: 8-4-4-4-12
        assert!(Uuid::parse_str(token.as_str()).is_ok());
    }

    #[test]
    fn test_from_raw() {
        let token = CorrelationToken::from_raw("fixed");
        assert_eq!(token.as_str(), "fixed");
    }
}
