//! Backend that forwards the task contract to a relay endpoint.
//!
//! The relay holds the real model credential and answers with task JSON:
//! the geocode / search-parks object directly, or `{text, sources?}` for
//! the advisory tasks. Errors come back as `{message}` with a status code.

use serde_json::Value;
use std::time::Duration;

use super::backend::{classify_status, ApiKey, GenerativeBackend};
use super::error::CuratorError;
use super::parse::parse_citations;
use super::types::{BackendReply, CuratorRequest};
use crate::storage::config::CuratorSettings;

/// Relay (task proxy) backend.
pub struct RelayBackend {
    http: reqwest::Client,
    /// Relay URL; `None` fails every call with a configuration error
    endpoint: Option<String>,
    /// Optional bearer token for the relay
    token: Option<ApiKey>,
}

impl RelayBackend {
    pub fn new(settings: &CuratorSettings, token: Option<ApiKey>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            endpoint: settings
                .relay_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            token,
        }
    }
}

impl GenerativeBackend for RelayBackend {
    async fn generate(&self, request: &CuratorRequest) -> Result<BackendReply, CuratorError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| CuratorError::Configuration("no relay URL configured".to_string()))?;

        tracing::debug!("Forwarding {} request to relay", request.task());

        let mut builder = self.http.post(endpoint).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.expose());
        }
        let response = builder.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        if request.task().expects_json() {
            return Ok(BackendReply::text(text));
        }

        advisory_reply(&text)
    }

    fn name(&self) -> &'static str {
        "relay"
    }
}

/// Unpack a `{text, sources?}` advisory reply.
fn advisory_reply(body: &str) -> Result<BackendReply, CuratorError> {
    let value: Value = serde_json::from_str(body)?;
    let text = value
        .get("text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CuratorError::Malformed("relay reply has no text".to_string()))?;

    Ok(BackendReply {
        text: text.to_string(),
        citations: parse_citations(value.get("sources")),
    })
}
