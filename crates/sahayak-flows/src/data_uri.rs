//! Data URI parsing and encoding.
//!
//! Every binary payload crossing a flow boundary travels as a
//! self-describing data URI: `data:<mimetype>;base64,<encoded_data>`.
//! Files and audio never arrive as raw handles.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Hard ceiling on decoded payload size, independent of configuration
/// (a browser audio recording or textbook photo fits comfortably).
pub const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

/// A decoded binary payload with its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared MIME type (e.g. `audio/webm`, `image/png`).
    pub mime_type: String,
    /// Decoded payload bytes.
    pub data: Vec<u8>,
}

impl DataUri {
    /// Builds a data URI from raw bytes.
    #[must_use]
    pub fn from_bytes(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Parses a `data:<mimetype>;base64,<body>` string.
    ///
    /// `field` names the flow input carrying the URI so validation errors
    /// can point at it.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidDataUri`] if the prefix, MIME type,
    /// base64 marker, or body is missing or malformed, if the decoded
    /// payload is empty, or if it exceeds [`MAX_PAYLOAD_BYTES`].
    pub fn parse(field: &str, uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| FlowError::invalid_data_uri(field, "missing 'data:' prefix"))?;

        let (header, body) = rest
            .split_once(',')
            .ok_or_else(|| FlowError::invalid_data_uri(field, "missing ',' separator"))?;

        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| FlowError::invalid_data_uri(field, "missing ';base64' marker"))?;

        if mime_type.is_empty() {
            return Err(FlowError::invalid_data_uri(field, "missing MIME type"));
        }

        let data = base64::engine::general_purpose::STANDARD
            .decode(body.as_bytes())
            .map_err(|e| FlowError::invalid_data_uri(field, format!("invalid base64: {e}")))?;

        if data.is_empty() {
            return Err(FlowError::invalid_data_uri(field, "payload is empty"));
        }

        if data.len() > MAX_PAYLOAD_BYTES {
            return Err(FlowError::invalid_data_uri(
                field,
                format!(
                    "payload is {} bytes, limit is {MAX_PAYLOAD_BYTES}",
                    data.len()
                ),
            ));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// Returns `true` if the declared MIME type is an audio type.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }

    /// Returns `true` if the declared MIME type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

impl std::fmt::Display for DataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

impl Serialize for DataUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse("dataUri", &s).map_err(serde::de::Error::custom)
    }
}
