//! Instant knowledge base.
//!
//! Concise answers to teacher questions, always paired with a simple
//! analogy they can reuse in class.

use serde::{Deserialize, Serialize};

use sahayak_model::{ModelClient, ModelRequest};

use crate::config::Config;
use crate::error::Result;
use crate::prompt;

use super::{generation_failure, require_non_empty};

const FLOW_NAME: &str = "instantKnowledgeBase";

const PROMPT_TEMPLATE: &str = r#"You are an expert in explaining complex topics with simple analogies.

A teacher has asked the following question:
{{{question}}}

Provide a concise answer to the question, including a simple analogy to help the teacher understand and explain the concept to their students.

Respond with a single JSON object: {"answer": "<your answer>"}"#;

/// Input for the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseInput {
    /// The teacher's question.
    pub question: String,
}

impl KnowledgeBaseInput {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("question", &self.question)
    }
}

/// An answer with its analogy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseOutput {
    /// The answer, including a simple analogy.
    pub answer: String,
}

/// Runs the knowledge base flow.
///
/// # Errors
///
/// Returns a validation error for bad input (no model call is made) or a
/// generation error if the model call fails or the output does not match
/// the schema.
pub async fn run(
    client: &dyn ModelClient,
    config: &Config,
    input: KnowledgeBaseInput,
) -> Result<KnowledgeBaseOutput> {
    input.validate()?;

    let rendered = prompt::render(FLOW_NAME, PROMPT_TEMPLATE, &[("question", &input.question)])?;
    let response = client
        .generate(ModelRequest::text(&config.text_model, rendered))
        .await
        .map_err(|e| generation_failure(FLOW_NAME, e))?;
    response
        .structured_json()
        .map_err(|e| generation_failure(FLOW_NAME, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::super::testing::MockModel;
    use super::*;

    #[tokio::test]
    async fn test_run_returns_answer() {
        let mock = MockModel::with_json(&json!({
            "answer": "The sky is blue because air scatters blue light, like mist spreading lamplight."
        }));
        let config = Config::default();
        let input = KnowledgeBaseInput {
            question: "Why is the sky blue?".to_string(),
        };

        let output = run(&mock, &config, input).await.unwrap();
        assert!(output.answer.contains("scatters"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_run_prompt_contains_question() {
        let mock = MockModel::with_json(&json!({"answer": "ok"}));
        let config = Config::default();
        let input = KnowledgeBaseInput {
            question: "Why is the sky blue?".to_string(),
        };

        run(&mock, &config, input).await.unwrap();

        let request = mock.last_request().unwrap();
        let sahayak_model::Part::Text(prompt) = &request.parts[0] else {
            panic!("expected a text part");
        };
        assert!(prompt.contains("Why is the sky blue?"));
    }

    #[tokio::test]
    async fn test_run_empty_question_makes_no_model_call() {
        let mock = MockModel::new();
        let config = Config::default();
        let input = KnowledgeBaseInput {
            question: String::new(),
        };

        let err = run(&mock, &config, input).await.unwrap_err();
        assert_eq!(err.field(), Some("question"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_unfenced_and_fenced_json_both_parse() {
        let mock = MockModel::new();
        mock.push_text("```json\n{\"answer\": \"fenced\"}\n```");
        let config = Config::default();
        let input = KnowledgeBaseInput {
            question: "What is photosynthesis?".to_string(),
        };

        let output = run(&mock, &config, input).await.unwrap();
        assert_eq!(output.answer, "fenced");
    }

    #[tokio::test]
    async fn test_run_model_failure_is_generation_error() {
        let mock = MockModel::failing(sahayak_model::ModelError::Authentication(
            "bad key".to_string(),
        ));
        let config = Config::default();
        let input = KnowledgeBaseInput {
            question: "Why?".to_string(),
        };

        let err = run(&mock, &config, input).await.unwrap_err();
        assert!(err.is_generation());
    }
}
