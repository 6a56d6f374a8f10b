//! Hyper-local content generation.
//!
//! Stories, explanations, or worksheets in the teacher's own language,
//! pitched at a grade level.

use serde::{Deserialize, Serialize};

use sahayak_model::{ModelClient, ModelRequest};

use crate::config::Config;
use crate::error::{FlowError, Result};
use crate::prompt;

use super::{generation_failure, require_non_empty};

const FLOW_NAME: &str = "hyperLocalContent";

const PROMPT_TEMPLATE: &str = r#"You are an expert in generating educational content tailored to local contexts.

Generate a {{{contentType}}} about {{{topic}}} in {{{language}}} for grade level {{{gradeLevel}}}.
The content should be engaging, culturally relevant, and easy to understand for students of that age.

Respond with a single JSON object: {"content": "<the generated content>"}"#;

/// The kind of content to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A narrative story.
    Story,
    /// A plain-language explanation.
    Explanation,
    /// A practice worksheet.
    Worksheet,
}

impl ContentType {
    /// Returns the kind as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Explanation => "explanation",
            Self::Worksheet => "worksheet",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for hyper-local content generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalContentInput {
    /// What to generate.
    pub content_type: ContentType,
    /// The subject of the content.
    pub topic: String,
    /// The local language to write in.
    pub language: String,
    /// The grade level the content is pitched at.
    pub grade_level: u32,
}

impl LocalContentInput {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("topic", &self.topic)?;
        require_non_empty("language", &self.language)?;
        if self.grade_level == 0 {
            return Err(FlowError::validation("gradeLevel", "must be at least 1"));
        }
        Ok(())
    }
}

/// Generated hyper-local content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalContentOutput {
    /// The generated content.
    pub content: String,
}

/// Runs the hyper-local content flow.
///
/// # Errors
///
/// Returns a validation error for bad input (no model call is made) or a
/// generation error if the model call fails or the output does not match
/// the schema.
pub async fn run(
    client: &dyn ModelClient,
    config: &Config,
    input: LocalContentInput,
) -> Result<LocalContentOutput> {
    input.validate()?;

    let grade = input.grade_level.to_string();
    let rendered = prompt::render(
        FLOW_NAME,
        PROMPT_TEMPLATE,
        &[
            ("contentType", input.content_type.as_str()),
            ("topic", &input.topic),
            ("language", &input.language),
            ("gradeLevel", &grade),
        ],
    )?;

    let response = client
        .generate(ModelRequest::text(&config.text_model, rendered))
        .await
        .map_err(|e| generation_failure(FLOW_NAME, e))?;
    response
        .structured_json()
        .map_err(|e| generation_failure(FLOW_NAME, e))
}
