//! Generative backend abstraction.
//!
//! A backend turns one [`CuratorRequest`] into raw reply text plus any
//! grounding citations. It performs a single attempt; retries, timeouts and
//! parsing live in the client.

use reqwest::StatusCode;
use std::future::Future;

use super::error::CuratorError;
use super::gemini::GeminiBackend;
use super::relay::RelayBackend;
use super::types::{BackendReply, CuratorRequest};
use crate::storage::config::{BackendKind, CuratorSettings};

/// Credential for the generative backend.
///
/// Debug output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key; blank input yields `None`.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        (!trimmed.is_empty()).then(|| ApiKey(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Trait for generative backends.
pub trait GenerativeBackend: Send + Sync {
    /// Perform one request attempt.
    fn generate(
        &self,
        request: &CuratorRequest,
    ) -> impl Future<Output = Result<BackendReply, CuratorError>> + Send;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Map a non-success HTTP reply to a curator error.
///
/// Quota signals win over everything else, then credential problems;
/// server errors and request timeouts are transient.
pub fn classify_status(status: StatusCode, body: &str) -> CuratorError {
    let lower = body.to_ascii_lowercase();

    if status == StatusCode::TOO_MANY_REQUESTS
        || lower.contains("resource_exhausted")
        || lower.contains("quota")
        || lower.contains("rate limit")
    {
        return CuratorError::QuotaExceeded;
    }

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || lower.contains("api_key_invalid")
        || lower.contains("api key not valid")
    {
        return CuratorError::InvalidCredential;
    }

    if lower.contains("api_key") || lower.contains("api key") {
        return CuratorError::Configuration("backend reports a missing API key".to_string());
    }

    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        return CuratorError::Transient(format!("backend returned status {}", status));
    }

    CuratorError::Rejected(format!("backend returned status {}", status))
}

/// Backend selected from configuration.
pub enum Backend {
    Gemini(GeminiBackend),
    Relay(RelayBackend),
}

impl Backend {
    /// Build the configured backend. Missing credentials surface on first use.
    pub fn from_settings(settings: &CuratorSettings, api_key: Option<ApiKey>) -> Self {
        match settings.backend {
            BackendKind::Gemini => Backend::Gemini(GeminiBackend::new(settings, api_key)),
            BackendKind::Relay => Backend::Relay(RelayBackend::new(settings, api_key)),
        }
    }
}

impl GenerativeBackend for Backend {
    async fn generate(&self, request: &CuratorRequest) -> Result<BackendReply, CuratorError> {
        match self {
            Backend::Gemini(backend) => backend.generate(request).await,
            Backend::Relay(backend) => backend.generate(request).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Backend::Gemini(backend) => backend.name(),
            Backend::Relay(backend) => backend.name(),
        }
    }
}
