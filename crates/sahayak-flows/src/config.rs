//! Configuration types for the Sahayak server.
//!
//! All knobs live in a single `sahayak.json`: which hosted models to call,
//! where the API lives, which environment variable carries the key, and
//! the listen port. A missing file means defaults; an invalid file is an
//! error.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "sahayak.json";

/// Default text/multimodal model.
fn default_text_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Default image-capable model for visual aid generation.
fn default_image_model() -> String {
    "gemini-2.0-flash-preview-image-generation".to_string()
}

/// Default model API endpoint.
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

/// Default environment variable holding the API key.
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Default HTTP listen port.
const fn default_port() -> u16 {
    9002
}

/// Default per-request timeout in seconds. Nothing else bounds an
/// in-flight generation.
const fn default_request_timeout() -> u64 {
    120
}

/// Default maximum accepted binary payload size in bytes (10 MiB).
const fn default_max_payload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Main configuration for the Sahayak server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Model used for all text and audio-transcription flows.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for visual aid (image) generation.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Base URL of the hosted model API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout for each model call, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum accepted size for audio/photo payloads, in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text_model: default_text_model(),
            image_model: default_image_model(),
            api_base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `sahayak.json`; if absent, returns defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON or
    /// invalid values.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            FlowError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from a specific directory.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load_from_file(&config_path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::ConfigParseError` for unreadable or malformed
    /// files and `FlowError::ConfigValidationError` for invalid values.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(FlowError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| FlowError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.text_model.trim().is_empty() {
            return Err(FlowError::config_validation(
                "textModel must not be empty",
                "Provide a model name such as 'gemini-2.0-flash' in your sahayak.json",
            ));
        }

        if self.image_model.trim().is_empty() {
            return Err(FlowError::config_validation(
                "imageModel must not be empty",
                "Provide an image-capable model name in your sahayak.json",
            ));
        }

        if self.api_base_url.trim().is_empty() {
            return Err(FlowError::config_validation(
                "apiBaseUrl must not be empty",
                "Provide the model API endpoint URL in your sahayak.json",
            ));
        }

        if self.api_key_env.trim().is_empty() {
            return Err(FlowError::config_validation(
                "apiKeyEnv must not be empty",
                "Name the environment variable that holds your API key",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(FlowError::config_validation(
                "requestTimeoutSecs must be greater than 0",
                "Set requestTimeoutSecs to at least 1 second in your sahayak.json",
            ));
        }

        if self.max_payload_bytes == 0 {
            return Err(FlowError::config_validation(
                "maxPayloadBytes must be greater than 0",
                "Set maxPayloadBytes large enough for a browser audio recording",
            ));
        }

        Ok(())
    }
}
