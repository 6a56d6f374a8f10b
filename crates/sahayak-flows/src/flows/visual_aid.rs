//! Visual aid generation.
//!
//! Simple line drawings from a text prompt, via the image-capable model.
//! Only this flow requests image output; the service requires the TEXT
//! modality to be present alongside IMAGE.

use serde::{Deserialize, Serialize};

use sahayak_model::{Modality, ModelClient, ModelRequest};

use crate::config::Config;
use crate::data_uri::DataUri;
use crate::error::{FlowError, Result};
use crate::prompt;

use super::{generation_failure, require_non_empty};

const FLOW_NAME: &str = "visualAid";

const PROMPT_TEMPLATE: &str = r"You are an AI assistant that generates simple visual aids like line drawings based on text prompts.

Generate an image based on the following prompt: {{{prompt}}}";

/// Input for visual aid generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualAidInput {
    /// Description of the drawing to generate.
    pub prompt: String,
}

impl VisualAidInput {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("prompt", &self.prompt)
    }
}

/// A generated visual aid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualAidOutput {
    /// The generated image as a data URI.
    pub image_url: DataUri,
}

/// Runs the visual aid flow.
///
/// # Errors
///
/// Returns a validation error for bad input (no model call is made) or a
/// generation error if the model call fails or returns no image.
pub async fn run(
    client: &dyn ModelClient,
    config: &Config,
    input: VisualAidInput,
) -> Result<VisualAidOutput> {
    input.validate()?;

    let rendered = prompt::render(FLOW_NAME, PROMPT_TEMPLATE, &[("prompt", &input.prompt)])?;
    let request = ModelRequest::text(&config.image_model, rendered)
        .with_modalities([Modality::Text, Modality::Image]);

    let response = client
        .generate(request)
        .await
        .map_err(|e| generation_failure(FLOW_NAME, e))?;

    let media = response
        .media
        .ok_or_else(|| FlowError::generation(FLOW_NAME, "no image was generated"))?;

    Ok(VisualAidOutput {
        image_url: DataUri::from_bytes(media.mime_type, media.data),
    })
}
