//! Differentiated worksheet generation.
//!
//! Turns a textbook page photo into one worksheet per requested grade
//! level, for multi-grade classrooms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sahayak_model::{ModelClient, ModelRequest};

use crate::config::Config;
use crate::data_uri::DataUri;
use crate::error::{FlowError, Result};
use crate::prompt;

use super::{generation_failure, require_non_empty};

const FLOW_NAME: &str = "differentiatedWorksheets";

const PROMPT_TEMPLATE: &str = r#"You are an expert teacher specializing in creating differentiated worksheets for multi-grade classrooms.

You will use the attached textbook page photo to generate differentiated worksheets for the specified grade levels.

Grade Levels: {{{gradeLevels}}}

Make sure to return worksheets in a format like this:
{
   "worksheets": {
      "grade1": "worksheet for grade 1",
      "grade2": "worksheet for grade 2"
   }
}"#;

/// Input for differentiated worksheet generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetsInput {
    /// The textbook page as a `data:<mime>;base64,...` URI.
    pub photo_data_uri: String,
    /// Comma-separated grade levels to differentiate for.
    pub grade_levels: String,
}

impl WorksheetsInput {
    /// Validates the input and decodes the photo payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self, max_payload_bytes: usize) -> Result<DataUri> {
        require_non_empty("gradeLevels", &self.grade_levels)?;
        require_non_empty("photoDataUri", &self.photo_data_uri)?;

        let photo = DataUri::parse("photoDataUri", &self.photo_data_uri)?;
        if !photo.is_image() {
            return Err(FlowError::validation(
                "photoDataUri",
                format!("expected an image MIME type, got '{}'", photo.mime_type),
            ));
        }
        if photo.data.len() > max_payload_bytes {
            return Err(FlowError::validation(
                "photoDataUri",
                format!(
                    "photo is {} bytes, limit is {max_payload_bytes}",
                    photo.data.len()
                ),
            ));
        }
        Ok(photo)
    }
}

/// Generated worksheets, keyed by grade label (e.g. `grade3`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetsOutput {
    /// Map of grade level to worksheet content.
    pub worksheets: BTreeMap<String, String>,
}

/// Runs the differentiated worksheet flow.
///
/// # Errors
///
/// Returns a validation error for bad input (no model call is made) or a
/// generation error if the model call fails, the output does not match the
/// schema, or the worksheet map comes back empty.
pub async fn run(
    client: &dyn ModelClient,
    config: &Config,
    input: WorksheetsInput,
) -> Result<WorksheetsOutput> {
    let photo = input.validate(config.max_payload_bytes)?;

    let rendered = prompt::render(
        FLOW_NAME,
        PROMPT_TEMPLATE,
        &[("gradeLevels", &input.grade_levels)],
    )?;
    let request =
        ModelRequest::text(&config.text_model, rendered).with_media(photo.mime_type, photo.data);

    let response = client
        .generate(request)
        .await
        .map_err(|e| generation_failure(FLOW_NAME, e))?;
    let output: WorksheetsOutput = response
        .structured_json()
        .map_err(|e| generation_failure(FLOW_NAME, e))?;

    if output.worksheets.is_empty() {
        return Err(FlowError::generation(
            FLOW_NAME,
            "model returned no worksheets",
        ));
    }

    Ok(output)
}
