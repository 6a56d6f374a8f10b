//! Error types for Sahayak flows.
//!
//! Two kinds of errors ever reach a user: a validation error raised before
//! any model call, and a generation error raised when the model call fails
//! or returns output that does not match its schema. Everything else here
//! is plumbing (config loading, payload decoding, recorder transitions).

use std::path::PathBuf;

/// A specialized `Result` type for Sahayak flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors that can occur while running Sahayak flows.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your sahayak.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Input Validation Errors
    // ========================================================================
    /// A flow input failed its schema before any external call was made.
    ///
    /// Surfaced inline next to the offending field; no model call occurs.
    #[error("Invalid input for field '{field}': {message}")]
    Validation {
        /// The offending input field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A binary payload was not a well-formed data URI.
    #[error("Invalid data URI for field '{field}': {message}")]
    InvalidDataUri {
        /// The field carrying the payload.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    // ========================================================================
    // Generation Errors
    // ========================================================================
    /// The external model call failed, timed out, or returned output that
    /// failed schema validation. Never retried; no partial result is kept.
    #[error("Generation failed for {flow}: {message}")]
    Generation {
        /// The flow whose model call failed.
        flow: String,
        /// What went wrong, as reported by the model boundary.
        message: String,
    },

    // ========================================================================
    // Recorder Errors
    // ========================================================================
    /// Invalid recording-session state transition attempted.
    #[error("Invalid recorder transition: cannot go from {from} to {to}")]
    InvalidTransition {
        /// The current state.
        from: String,
        /// The attempted target state.
        to: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `Validation` error naming the offending field.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidDataUri` error for the given field.
    #[must_use]
    pub fn invalid_data_uri(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDataUri {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Generation` error for the given flow.
    #[must_use]
    pub fn generation(flow: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            flow: flow.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Returns `true` if this error was raised before any external call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidDataUri { .. })
    }

    /// Returns `true` if this error came from the model boundary.
    #[must_use]
    pub const fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    /// Returns the offending field name, if this is a validation error.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } | Self::InvalidDataUri { field, .. } => {
                Some(field.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_field() {
        let err = FlowError::validation("topic", "must not be empty");
        assert!(err.is_validation());
        assert!(!err.is_generation());
        assert_eq!(err.field(), Some("topic"));
        assert!(err.to_string().contains("topic"));
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_data_uri_error_is_validation() {
        let err = FlowError::invalid_data_uri("audioDataUri", "missing base64 marker");
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("audioDataUri"));
    }

    #[test]
    fn test_generation_error() {
        let err = FlowError::generation("readingAssessment", "model server error");
        assert!(err.is_generation());
        assert!(!err.is_validation());
        assert!(err.field().is_none());
        assert!(err.to_string().contains("readingAssessment"));
    }

    #[test]
    fn test_config_parse_error_display() {
        let err = FlowError::config_parse("/etc/sahayak.json", "trailing comma");
        let msg = err.to_string();
        assert!(msg.contains("/etc/sahayak.json"));
        assert!(msg.contains("Suggestion"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = FlowError::invalid_transition("idle", "ready");
        assert!(err.to_string().contains("idle"));
        assert!(err.to_string().contains("ready"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FlowError = io_err.into();
        assert!(matches!(err, FlowError::Io(_)));
    }
}
