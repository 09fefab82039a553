//! Gemini HTTP vision backend
//!
//! Sends the face photograph as inline base64 data alongside the instruction
//! prompt to the `generateContent` endpoint and returns the concatenated text
//! of the first candidate.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pipeline::{VisionError, VisionOracle, VisionRequest};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::LlmError;

/// Default Gemini API host
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default multimodal model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`GeminiVisionOracle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a configuration with default model, host and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// A [`VisionOracle`] backed by the Gemini API.
#[derive(Clone)]
pub struct GeminiVisionOracle {
    client: Client,
    config: GeminiConfig,
}

impl std::fmt::Debug for GeminiVisionOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiVisionOracle")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiVisionOracle {
    /// Create a new Gemini vision oracle
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .use_rustls_tls()
            .build()
            .map_err(|e| LlmError::Misconfiguration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn build_body(request: &VisionRequest) -> GenerateRequest<'_> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: &request.prompt,
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type,
                            data: BASE64.encode(&request.image),
                        },
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl VisionOracle for GeminiVisionOracle {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, request: VisionRequest) -> Result<String, VisionError> {
        debug!(
            provider = "gemini",
            model = %self.config.model,
            image_bytes = request.image.len(),
            mime_type = request.mime_type,
            "Sending face image to Gemini"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(self.config.timeout)
            .json(&Self::build_body(&request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VisionError::VisionFailure(format!(
                        "Gemini request timed out after {:?}",
                        self.config.timeout
                    ))
                } else {
                    VisionError::VisionFailure(format!("Gemini request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorEnvelope>()
                .await
                .map(|env| env.error.message)
                .unwrap_or_default();
            warn!(provider = "gemini", status = status.as_u16(), "Gemini returned an error status");
            return Err(map_status(status, &detail));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            VisionError::VisionFailure(format!("Failed to parse Gemini response: {e}"))
        })?;
        let text = body.text();
        if text.trim().is_empty() {
            return Err(VisionError::VisionFailure(
                "Gemini response missing text content".to_string(),
            ));
        }

        debug!(provider = "gemini", reply = %text, "Gemini reply received");
        Ok(text)
    }
}

/// Map an unsuccessful HTTP status to a [`VisionError`]
fn map_status(status: StatusCode, detail: &str) -> VisionError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication failed",
        StatusCode::TOO_MANY_REQUESTS => "quota exceeded",
        s if s.is_server_error() => "service unavailable",
        _ => "request rejected",
    };
    if detail.is_empty() {
        VisionError::VisionFailure(format!("Gemini {kind}: {status}"))
    } else {
        VisionError::VisionFailure(format!("Gemini {kind}: {status}: {detail}"))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
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
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
