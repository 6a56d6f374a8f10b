//! Sahayak Flows
//!
//! The six teaching-assistance flows, the recording-session state machine,
//! and the HTTP API and pages that expose them.

pub mod api;
pub mod config;
pub mod data_uri;
pub mod error;
pub mod flows;
pub mod prompt;
pub mod recorder;
pub mod theme;

mod pages;

pub use api::{
    create_router, AppState, ErrorResponse, ReportFormat, ReportRequest, ThemeResponse,
    ThemeUpdateRequest,
};
pub use config::Config;
pub use data_uri::{DataUri, MAX_PAYLOAD_BYTES};
pub use error::{FlowError, Result};
pub use recorder::{RecordedClip, RecorderPhase, RecordingSession};
pub use theme::ThemeMode;
