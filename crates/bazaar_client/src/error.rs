//! # Client Error Types
//!
//! All errors the marketplace client can surface, plus the provider
//! error carrier with its tolerated-absence signature.

use std::fmt;

use thiserror::Error;

/// Machine-readable code a provider attaches to "no winner yet" errors.
pub const NO_WINNER_CODE: &str = "NO_WINNER";

/// Message fragment legacy gateways use for the same condition.
pub const NO_WINNER_FRAGMENT: &str = "Could not find auction";

/// Errors that can occur in the marketplace client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A read or write was attempted before a marketplace handle exists.
    #[error("marketplace handle is not available")]
    MissingHandle,

    /// A write was attempted without a required parameter.
    #[error("missing required parameter: {name}")]
    MissingParameter {
        /// The parameter that was absent.
        name: &'static str,
    },

    /// A write was attempted with no wallet connected.
    #[error("no wallet connected; writes require an active account")]
    Unauthenticated,

    /// The handle does not carry the capability the operation needs.
    #[error("marketplace handle does not support {operation}")]
    Unsupported {
        /// The operation that was requested.
        operation: &'static str,
    },

    /// The provider reported a failure.
    #[error("provider error: {0}")]
    Provider(ProviderError),

    /// Query parameters or cached payloads failed to (de)serialize.
    #[error("serialization failed: {message}")]
    Serialization {
        /// What the serializer reported.
        message: String,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Builds a serialization error from any serializer's failure.
    #[must_use]
    pub fn serialization(err: &dyn std::error::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// A failure reported by a marketplace provider.
///
/// Providers attach a machine-readable `code` when they have one;
/// older gateways only produce a message. Both forms are kept so the
/// tolerated-absence check can prefer the structured code and still
/// recognize the legacy message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    code: Option<String>,
    message: String,
}

impl ProviderError {
    /// A provider failure carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// A provider failure carrying a machine-readable code.
    #[must_use]
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// The canonical "auction has no winner yet" failure.
    #[must_use]
    pub fn no_winner() -> Self {
        Self::with_code(NO_WINNER_CODE, "Could not find auction winner")
    }

    /// Whether this failure means "no winner yet" rather than a fault.
    ///
    /// The structured code is checked first; the message fragment is a
    /// fallback for gateways that predate the code.
    #[must_use]
    pub fn is_no_winner(&self) -> bool {
        if let Some(code) = &self.code {
            return code == NO_WINNER_CODE;
        }
        self.message.contains(NO_WINNER_FRAGMENT)
    }

    /// Machine-readable failure code, when the provider supplied one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Human-readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_winner_prefers_structured_code() {
        let coded = ProviderError::no_winner();
        assert!(coded.is_no_winner());

        // A code that is present but different must win over the message.
        let mismatched = ProviderError::with_code("REVERTED", "Could not find auction winner");
        assert!(!mismatched.is_no_winner());
    }

    #[test]
    fn test_no_winner_legacy_fragment_fallback() {
        let legacy = ProviderError::new("execution failed: Could not find auction with id 9");
        assert!(legacy.is_no_winner());

        let unrelated = ProviderError::new("execution reverted");
        assert!(!unrelated.is_no_winner());
    }

    #[test]
    fn test_display_includes_code() {
        let err = ProviderError::with_code("NO_WINNER", "nothing yet");
        assert_eq!(err.to_string(), "[NO_WINNER] nothing yet");
        assert_eq!(ProviderError::new("plain").to_string(), "plain");
    }
}
