//! Sahayak Model Boundary
//!
//! Types and traits for talking to a hosted generative model.
//!
//! Every Sahayak flow performs exactly one call through [`ModelClient`] and
//! treats the endpoint as a black box: it either returns structured output
//! or fails. No retries, no streaming, no partial results are synthesized
//! on this side of the boundary.

mod gemini;

pub use gemini::GeminiClient;

use serde::de::DeserializeOwned;

/// Errors that can occur when calling the hosted model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The API rejected our credentials.
    #[error("model authentication failed: {0}")]
    Authentication(String),

    /// The API rate limit was exceeded.
    #[error("model rate limit exceeded: {0}")]
    RateLimit(String),

    /// The model service returned a server-side error.
    #[error("model server error (status {status}): {message}")]
    Server {
        /// HTTP status code returned by the service.
        status: u16,
        /// Body or reason phrase accompanying the status.
        message: String,
    },

    /// The request never completed (connectivity, DNS, timeout).
    #[error("model request failed: {0}")]
    Network(String),

    /// The call succeeded but the payload was not usable.
    #[error("model returned an unusable response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Returns `true` if a later identical call might succeed.
    ///
    /// Sahayak never retries automatically; this exists so callers can
    /// phrase their error messages accordingly.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimit(_) | Self::Server { .. } | Self::Network(_)
        )
    }
}

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Plain prompt text.
    Text(String),
    /// An inline binary payload (audio or image).
    Media {
        /// MIME type of the payload (e.g. `audio/webm`, `image/png`).
        mime_type: String,
        /// Raw (decoded) payload bytes.
        data: Vec<u8>,
    },
}

/// Response modalities a request may ask the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// Text output.
    Text,
    /// Image output.
    Image,
}

/// A single request to the hosted model.
///
/// Built by flows from a rendered prompt template plus any binary payloads.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Name of the model to invoke (e.g. `gemini-2.0-flash`).
    pub model: String,
    /// Ordered prompt parts.
    pub parts: Vec<Part>,
    /// Requested response modalities. Empty means the service default
    /// (text only).
    pub response_modalities: Vec<Modality>,
}

impl ModelRequest {
    /// Creates a text-only request.
    #[must_use]
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: vec![Part::Text(prompt.into())],
            response_modalities: Vec::new(),
        }
    }

    /// Appends an inline media part.
    #[must_use]
    pub fn with_media(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.parts.push(Part::Media {
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    /// Sets the requested response modalities.
    #[must_use]
    pub fn with_modalities(mut self, modalities: impl IntoIterator<Item = Modality>) -> Self {
        self.response_modalities = modalities.into_iter().collect();
        self
    }
}

/// An inline binary payload returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    /// MIME type of the payload.
    pub mime_type: String,
    /// Raw (decoded) payload bytes.
    pub data: Vec<u8>,
}

/// What came back from the model.
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    /// Concatenated text parts, if any.
    pub text: Option<String>,
    /// First media part, if any.
    pub media: Option<Media>,
}

impl ModelResponse {
    /// Deserializes the text payload as JSON into `T`.
    ///
    /// Models that are asked for structured output frequently wrap the JSON
    /// in a markdown code fence; the fence is stripped before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidResponse`] if there is no text payload
    /// or it does not deserialize into `T`.
    pub fn structured_json<T: DeserializeOwned>(&self) -> Result<T, ModelError> {
        let text = self
            .text
            .as_deref()
            .ok_or_else(|| ModelError::InvalidResponse("no text in response".to_string()))?;

        let stripped = strip_code_fence(text);
        serde_json::from_str(stripped)
            .map_err(|e| ModelError::InvalidResponse(format!("output schema mismatch: {e}")))
    }
}

/// Removes a surrounding markdown code fence (```json ... ```), if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line.
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// A client for a hosted generative model.
///
/// Object safe so the HTTP layer can swap in a mock during tests.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Performs one generation call.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] describing why the call failed. The caller
    /// decides how to surface it; no retries happen here.
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Payload {
        answer: String,
    }

    #[test]
    fn test_structured_json_plain() {
        let response = ModelResponse {
            text: Some(r#"{"answer": "42"}"#.to_string()),
            media: None,
        };
        let payload: Payload = response.structured_json().unwrap();
        assert_eq!(payload.answer, "42");
    }

    #[test]
    fn test_structured_json_fenced() {
        let response = ModelResponse {
            text: Some("```json\n{\"answer\": \"42\"}\n```".to_string()),
            media: None,
        };
        let payload: Payload = response.structured_json().unwrap();
        assert_eq!(payload.answer, "42");
    }

    #[test]
    fn test_structured_json_no_text() {
        let response = ModelResponse::default();
        let err = response.structured_json::<Payload>().unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[test]
    fn test_structured_json_schema_mismatch() {
        let response = ModelResponse {
            text: Some(r#"{"unexpected": true}"#.to_string()),
            media: None,
        };
        let err = response.structured_json::<Payload>().unwrap_err();
        assert!(err.to_string().contains("output schema mismatch"));
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_model_request_builders() {
        let request = ModelRequest::text("gemini-2.0-flash", "hello")
            .with_media("audio/webm", vec![1, 2, 3])
            .with_modalities([Modality::Text, Modality::Image]);

        assert_eq!(request.model, "gemini-2.0-flash");
        assert_eq!(request.parts.len(), 2);
        assert_eq!(request.response_modalities.len(), 2);
        assert!(matches!(request.parts[0], Part::Text(ref t) if t == "hello"));
    }

    #[test]
    fn test_error_is_transient() {
        assert!(ModelError::RateLimit("slow down".to_string()).is_transient());
        assert!(ModelError::Network("timed out".to_string()).is_transient());
        assert!(ModelError::Server {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(!ModelError::Authentication("bad key".to_string()).is_transient());
        assert!(!ModelError::InvalidResponse("garbage".to_string()).is_transient());
    }
}
