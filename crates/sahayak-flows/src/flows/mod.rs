//! The six assistance flows.
//!
//! Every flow follows the same contract: a typed input with `validate()`
//! raising field-referencing errors before anything leaves the process, a
//! fixed prompt template, exactly one [`ModelClient`] call, and a typed
//! output checked against its schema. A model failure or schema mismatch
//! becomes a generation error; nothing is retried and no partial result is
//! kept. Flows share no state with each other.

pub mod knowledge_base;
pub mod lesson_planner;
pub mod local_content;
pub mod reading_assessment;
pub mod visual_aid;
pub mod worksheets;

use sahayak_model::ModelError;

use crate::error::{FlowError, Result};

/// Rejects empty or whitespace-only values for a required field.
fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FlowError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Wraps a model-boundary failure as this flow's generation error.
fn generation_failure(flow: &str, err: ModelError) -> FlowError {
    FlowError::generation(flow, err.to_string())
}


#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty_accepts_text() {
        assert!(require_non_empty("topic", "the water cycle").is_ok());
    }

    #[test]
    fn test_require_non_empty_rejects_whitespace() {
        let err = match require_non_empty("topic", "   ") {
            Err(e) => e,
            Ok(()) => panic!("expected validation error"),
        };
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("topic"));
    }

    #[test]
    fn test_generation_failure_names_flow() {
        let err = generation_failure(
            "visualAid",
            ModelError::Network("connection reset".to_string()),
        );
        assert!(err.is_generation());
        assert!(err.to_string().contains("visualAid"));
        assert!(err.to_string().contains("connection reset"));
    }
}
