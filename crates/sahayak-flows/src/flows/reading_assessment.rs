//! Audio reading assessment.
//!
//! The model transcribes and scores the recording; words-per-minute is
//! derived locally from the returned transcript and the caller-measured
//! duration, never by the model.

use serde::{Deserialize, Serialize};

use sahayak_model::{ModelClient, ModelRequest};

use crate::config::Config;
use crate::data_uri::DataUri;
use crate::error::{FlowError, Result};
use crate::prompt;

use super::{generation_failure, require_non_empty};

const FLOW_NAME: &str = "readingAssessment";

const PROMPT_TEMPLATE: &str = r#"You are an expert reading assessment tool for young students in India.
Your task is to analyze an audio recording of a student reading a passage and provide a helpful assessment for their teacher.

1. Transcribe the audio provided. Be accurate with the transcription.
2. Compare your transcription to the original passage text provided below.
3. Calculate the accuracy as a percentage of correctly read words.
4. Provide constructive, encouraging feedback for the teacher about the student's reading. Mention specific errors if any (e.g., mispronounced words, skipped words), and suggest areas for improvement. Keep the feedback concise and actionable.

Original Passage:
"{{{passage}}}"

The student's reading audio is attached.

Respond with a single JSON object:
{"transcript": "<the transcription>", "accuracy": <0-100>, "feedback": "<feedback for the teacher>"}"#;

/// Input for a reading assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingAssessmentInput {
    /// The passage the student was supposed to read.
    pub passage: String,
    /// The recording as a `data:<mime>;base64,...` URI.
    pub audio_data_uri: String,
    /// Duration of the recording in seconds, measured by the recorder.
    pub duration_seconds: f64,
}

impl ReadingAssessmentInput {
    /// Validates the input and decodes the audio payload.
    ///
    /// A non-positive duration is accepted; it only zeroes the
    /// words-per-minute figure.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self, max_payload_bytes: usize) -> Result<DataUri> {
        require_non_empty("passage", &self.passage)?;
        require_non_empty("audioDataUri", &self.audio_data_uri)?;

        let audio = DataUri::parse("audioDataUri", &self.audio_data_uri)?;
        if !audio.is_audio() {
            return Err(FlowError::validation(
                "audioDataUri",
                format!("expected an audio MIME type, got '{}'", audio.mime_type),
            ));
        }
        if audio.data.len() > max_payload_bytes {
            return Err(FlowError::validation(
                "audioDataUri",
                format!(
                    "recording is {} bytes, limit is {max_payload_bytes}",
                    audio.data.len()
                ),
            ));
        }
        Ok(audio)
    }
}

/// What the model itself returns; words-per-minute is added locally.
#[derive(Debug, Deserialize)]
struct ModelAssessment {
    transcript: String,
    accuracy: f64,
    feedback: String,
}

/// A completed reading assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingAssessmentOutput {
    /// Transcription of the student's reading.
    pub transcript: String,
    /// Percentage of words read correctly, 0 to 100.
    pub accuracy: f64,
    /// Reading speed derived from the transcript and duration.
    pub words_per_minute: u32,
    /// Qualitative feedback for the teacher.
    pub feedback: String,
}

/// Words per minute over the recording, rounded to the nearest integer.
///
/// Words are whitespace-separated tokens of the transcript. Any
/// non-positive duration yields zero rather than an error.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn words_per_minute(transcript: &str, duration_seconds: f64) -> u32 {
    if duration_seconds <= 0.0 {
        return 0;
    }
    let words = transcript.split_whitespace().count();
    (words as f64 / duration_seconds * 60.0).round() as u32
}

/// Runs the reading assessment flow.
///
/// # Errors
///
/// Returns a validation error for bad input (no model call is made) or a
/// generation error if the model call fails, the output does not match the
/// schema, or the accuracy is out of range.
pub async fn run(
    client: &dyn ModelClient,
    config: &Config,
    input: ReadingAssessmentInput,
) -> Result<ReadingAssessmentOutput> {
    let audio = input.validate(config.max_payload_bytes)?;

    let rendered = prompt::render(FLOW_NAME, PROMPT_TEMPLATE, &[("passage", &input.passage)])?;
    let request =
        ModelRequest::text(&config.text_model, rendered).with_media(audio.mime_type, audio.data);

    let response = client
        .generate(request)
        .await
        .map_err(|e| generation_failure(FLOW_NAME, e))?;
    let assessment: ModelAssessment = response
        .structured_json()
        .map_err(|e| generation_failure(FLOW_NAME, e))?;

    if !(0.0..=100.0).contains(&assessment.accuracy) {
        return Err(FlowError::generation(
            FLOW_NAME,
            format!("accuracy {} is outside 0-100", assessment.accuracy),
        ));
    }

    let wpm = words_per_minute(&assessment.transcript, input.duration_seconds);
    tracing::debug!(
        accuracy = assessment.accuracy,
        words_per_minute = wpm,
        "reading assessment complete"
    );

    Ok(ReadingAssessmentOutput {
        transcript: assessment.transcript,
        accuracy: assessment.accuracy,
        words_per_minute: wpm,
        feedback: assessment.feedback,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::super::testing::MockModel;
    use super::*;

    fn valid_input() -> ReadingAssessmentInput {
        ReadingAssessmentInput {
            passage: "The cat sat on the mat.".to_string(),
            audio_data_uri: DataUri::from_bytes("audio/webm", vec![1, 2, 3]).to_string(),
            duration_seconds: 30.0,
        }
    }

    #[test]
    fn test_wpm_three_words_over_thirty_seconds() {
        assert_eq!(words_per_minute("The cat sat", 30.0), 6);
    }

    #[test]
    fn test_wpm_zero_duration() {
        assert_eq!(words_per_minute("The cat sat", 0.0), 0);
    }

    #[test]
    fn test_wpm_negative_duration() {
        assert_eq!(words_per_minute("some words here", -5.0), 0);
    }

    #[test]
    fn test_wpm_empty_transcript() {
        assert_eq!(words_per_minute("", 30.0), 0);
        assert_eq!(words_per_minute("   ", 30.0), 0);
    }

    #[test]
    fn test_wpm_rounds_to_nearest() {
        // 5 words over 40 seconds = 7.5 wpm, rounds to 8.
        assert_eq!(words_per_minute("one two three four five", 40.0), 8);
    }

    #[test]
    fn test_wpm_collapses_whitespace() {
        assert_eq!(words_per_minute("  The \t cat \n sat  ", 30.0), 6);
    }

    #[tokio::test]
    async fn test_run_returns_assessment_with_local_wpm() {
        let mock = MockModel::with_json(&json!({
            "transcript": "The cat sat",
            "accuracy": 92.5,
            "feedback": "Nice pace, watch the ending."
        }));
        let config = Config::default();

        let output = run(&mock, &config, valid_input()).await.unwrap();
        assert_eq!(output.transcript, "The cat sat");
        assert!((output.accuracy - 92.5).abs() < f64::EPSILON);
        assert_eq!(output.words_per_minute, 6);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_run_attaches_audio_and_passage() {
        let mock = MockModel::with_json(&json!({
            "transcript": "x",
            "accuracy": 50.0,
            "feedback": "ok"
        }));
        let config = Config::default();

        run(&mock, &config, valid_input()).await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.model, config.text_model);
        assert!(matches!(
            &request.parts[0],
            sahayak_model::Part::Text(t) if t.contains("The cat sat on the mat.")
        ));
        assert!(matches!(
            &request.parts[1],
            sahayak_model::Part::Media { mime_type, data }
                if mime_type == "audio/webm" && *data == vec![1, 2, 3]
        ));
    }

    #[tokio::test]
    async fn test_run_empty_passage_makes_no_model_call() {
        let mock = MockModel::new();
        let config = Config::default();
        let input = ReadingAssessmentInput {
            passage: String::new(),
            ..valid_input()
        };

        let err = run(&mock, &config, input).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("passage"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_rejects_non_audio_payload() {
        let mock = MockModel::new();
        let config = Config::default();
        let input = ReadingAssessmentInput {
            audio_data_uri: DataUri::from_bytes("image/png", vec![1]).to_string(),
            ..valid_input()
        };

        let err = run(&mock, &config, input).await.unwrap_err();
        assert_eq!(err.field(), Some("audioDataUri"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_rejects_oversized_recording() {
        let mock = MockModel::new();
        let config = Config {
            max_payload_bytes: 2,
            ..Default::default()
        };

        let err = run(&mock, &config, valid_input()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_accuracy_out_of_range_is_generation_error() {
        let mock = MockModel::with_json(&json!({
            "transcript": "x",
            "accuracy": 150.0,
            "feedback": "ok"
        }));
        let config = Config::default();

        let err = run(&mock, &config, valid_input()).await.unwrap_err();
        assert!(err.is_generation());
    }

    #[tokio::test]
    async fn test_run_model_failure_is_generation_error() {
        let mock = MockModel::failing(sahayak_model::ModelError::Network(
            "timed out".to_string(),
        ));
        let config = Config::default();

        let err = run(&mock, &config, valid_input()).await.unwrap_err();
        assert!(err.is_generation());
        assert!(err.to_string().contains("readingAssessment"));
    }

    #[tokio::test]
    async fn test_run_schema_mismatch_is_generation_error() {
        let mock = MockModel::with_json(&json!({"unexpected": true}));
        let config = Config::default();

        let err = run(&mock, &config, valid_input()).await.unwrap_err();
        assert!(err.is_generation());
    }

    #[tokio::test]
    async fn test_run_zero_duration_yields_zero_wpm() {
        let mock = MockModel::with_json(&json!({
            "transcript": "The cat sat",
            "accuracy": 80.0,
            "feedback": "ok"
        }));
        let config = Config::default();
        let input = ReadingAssessmentInput {
            duration_seconds: 0.0,
            ..valid_input()
        };

        let output = run(&mock, &config, input).await.unwrap();
        assert_eq!(output.words_per_minute, 0);
    }
}
