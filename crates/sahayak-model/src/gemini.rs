//! HTTP client for the Google Generative Language API.
//!
//! One `generateContent` call per request; failures are classified into
//! [`ModelError`] variants so callers can phrase their error messages, but
//! nothing in Sahayak retries on its own.

use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Media, Modality, ModelClient, ModelError, ModelRequest, ModelResponse, Part};

/// Default endpoint for the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for Gemini-family models over the Generative Language REST API.
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Creates a new client with the given endpoint, API key, and timeout.
    ///
    /// The timeout bounds each individual `generateContent` call; there is
    /// no application-level timeout beyond it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Network`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait::async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );
        let body = GenerateContentRequest::from_request(&request);

        debug!(model = %request.model, parts = request.parts.len(), "Calling model");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "Model call failed");
            return Err(classify_status(status.as_u16(), message));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("malformed response body: {e}")))?;

        payload.into_response()
    }
}

/// Maps a transport-level failure onto a [`ModelError`].
fn classify_send_error(error: reqwest::Error) -> ModelError {
    if error.is_timeout() {
        ModelError::Network("request timed out".to_string())
    } else {
        ModelError::Network(error.to_string())
    }
}

/// Maps a non-success HTTP status onto a [`ModelError`].
fn classify_status(status: u16, message: String) -> ModelError {
    match status {
        401 | 403 => ModelError::Authentication(message),
        429 => ModelError::RateLimit(message),
        500..=599 => ModelError::Server { status, message },
        _ => ModelError::InvalidResponse(format!("unexpected status {status}: {message}")),
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn from_request(request: &ModelRequest) -> Self {
        let parts = request.parts.iter().map(WirePart::from_part).collect();
        let generation_config = if request.response_modalities.is_empty() {
            None
        } else {
            Some(GenerationConfig {
                response_modalities: request
                    .response_modalities
                    .iter()
                    .map(|m| match m {
                        Modality::Text => "TEXT".to_string(),
                        Modality::Image => "IMAGE".to_string(),
                    })
                    .collect(),
            })
        };

        Self {
            contents: vec![WireContent { parts }],
            generation_config,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl WirePart {
    fn from_part(part: &Part) -> Self {
        match part {
            Part::Text(text) => Self {
                text: Some(text.clone()),
                inline_data: None,
            },
            Part::Media { mime_type, data } => Self {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(data),
                }),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<WireContent>,
}

impl GenerateContentResponse {
    /// Collapses the first candidate into a [`ModelResponse`].
    ///
    /// Text parts are concatenated; the first inline-data part becomes the
    /// media payload. A response with neither is unusable.
    fn into_response(self) -> Result<ModelResponse, ModelError> {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        let mut text_parts: Vec<String> = Vec::new();
        let mut media = None;

        for part in parts {
            if let Some(text) = part.text {
                text_parts.push(text);
            }
            if media.is_none() {
                if let Some(inline) = part.inline_data {
                    let data = base64::engine::general_purpose::STANDARD
                        .decode(inline.data.as_bytes())
                        .map_err(|e| {
                            ModelError::InvalidResponse(format!("invalid inline data: {e}"))
                        })?;
                    media = Some(Media {
                        mime_type: inline.mime_type,
                        data,
                    });
                }
            }
        }

        let text = if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join(""))
        };

        if text.is_none() && media.is_none() {
            return Err(ModelError::InvalidResponse(
                "response contained no candidates".to_string(),
            ));
        }

        Ok(ModelResponse { text, media })
    }
}
