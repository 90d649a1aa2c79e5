//! Curator error definitions.

use thiserror::Error;

/// Failures of a single curator call.
///
/// Display text may carry backend detail such as URLs or upstream
/// messages. Show [`CuratorError::user_message`] to users instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CuratorError {
    /// Credential or endpoint missing
    #[error("Curator not configured: {0}")]
    Configuration(String),

    /// Backend refused the credential
    #[error("Curator rejected the configured credential")]
    InvalidCredential,

    /// Rate limit or quota exhausted
    #[error("Curator quota exceeded")]
    QuotaExceeded,

    /// Network failure, timeout or server error
    #[error("Transient curator failure: {0}")]
    Transient(String),

    /// Empty body or no usable JSON in the reply
    #[error("Malformed curator response: {0}")]
    Malformed(String),

    /// Reply was well-formed but resolved to nothing usable
    #[error("No match for '{0}'")]
    NoMatch(String),

    /// Request refused for a reason retrying will not fix
    #[error("Curator rejected the request: {0}")]
    Rejected(String),
}

impl CuratorError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CuratorError::Transient(_) | CuratorError::Malformed(_))
    }

    /// Whether the host has to fix its configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CuratorError::Configuration(_) | CuratorError::InvalidCredential
        )
    }

    /// Fixed text for the user; never includes backend detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            CuratorError::Configuration(_) | CuratorError::InvalidCredential => {
                "The curator is not configured. Set an API key and try again."
            }
            CuratorError::QuotaExceeded => {
                "The curator has reached its usage limit. Try again later."
            }
            CuratorError::Transient(_) | CuratorError::Malformed(_) => {
                "The curator could not be reached. Try again in a moment."
            }
            CuratorError::NoMatch(_) => "The curator had no answer for that.",
            CuratorError::Rejected(_) => "The curator declined this request.",
        }
    }
}

impl From<serde_json::Error> for CuratorError {
    fn from(err: serde_json::Error) -> Self {
        CuratorError::Malformed(err.to_string())
    }
}

impl From<reqwest::Error> for CuratorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CuratorError::Malformed(err.to_string())
        } else if err.is_builder() {
            CuratorError::Configuration(err.to_string())
        } else {
            // connect, timeout, body and redirect failures
            CuratorError::Transient(err.to_string())
        }
    }
}
