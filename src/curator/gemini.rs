//! Direct client for the Gemini `generateContent` REST endpoint.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::backend::{classify_status, ApiKey, GenerativeBackend};
use super::error::CuratorError;
use super::parse::dedupe_citations;
use super::prompts;
use super::types::{BackendReply, Citation, CuratorRequest};
use crate::storage::config::CuratorSettings;

/// Gemini REST backend.
pub struct GeminiBackend {
    /// HTTP client
    http: reqwest::Client,
    /// API root, e.g. `https://generativelanguage.googleapis.com/v1beta`
    endpoint: String,
    /// Model id
    model: String,
    /// API key; checked on every call
    api_key: Option<ApiKey>,
}

impl GeminiBackend {
    pub fn new(settings: &CuratorSettings, api_key: Option<ApiKey>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, request: &CuratorRequest) -> Result<BackendReply, CuratorError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            CuratorError::Configuration("no API key configured".to_string())
        })?;

        let prompt = prompts::render(request);
        let body = GenerateContentBody::new(request, &prompt);

        tracing::debug!("Sending {} request to model {}", request.task(), self.model);

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        parsed.into_reply()
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ---- request body ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSpec>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSpec {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl<'a> GenerateContentBody<'a> {
    fn new(request: &CuratorRequest, prompt: &'a prompts::Prompt) -> Self {
        let task = request.task();
        let tools = if task.grounded() {
            vec![ToolSpec {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };
        // JSON mode cannot be combined with the search tool; grounded JSON
        // replies go through extraction instead.
        let response_mime_type =
            (task.expects_json() && !task.grounded()).then_some("application/json");

        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart { text: &prompt.user }],
            }],
            system_instruction: prompt.system.map(|text| Content {
                role: None,
                parts: vec![TextPart { text }],
            }),
            tools,
            generation_config: GenerationConfig {
                temperature: task.temperature(),
                response_mime_type,
            },
        }
    }
}

// ---- response body ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_reply(self) -> Result<BackendReply, CuratorError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(CuratorError::Rejected(format!("prompt blocked: {}", reason)));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| CuratorError::Malformed("no candidates in reply".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CuratorError::Malformed("empty reply text".to_string()));
        }

        let citations = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web)
            .filter_map(|web| {
                let uri = web.uri?;
                let title = web.title.unwrap_or_else(|| uri.clone());
                Some(Citation { title, uri })
            });

        Ok(BackendReply {
            text,
            citations: dedupe_citations(citations),
        })
    }
}
