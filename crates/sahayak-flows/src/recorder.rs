//! Recording-session state machine.
//!
//! Models browser-side audio capture as explicit states instead of ad hoc
//! callback chains:
//!
//! ```text
//! NoPermission -> Idle -> Recording -> Ready
//!                           ^            |
//!                           +------------+   (re-record discards the
//!                                            previous buffer entirely)
//! ```
//!
//! No state is terminal; the session may be released at any time. The
//! microphone stream is scoped to `Recording` and released on `stop` or
//! [`RecordingSession::release`].

use chrono::{DateTime, Utc};

use crate::data_uri::DataUri;
use crate::error::{FlowError, Result};

/// Phase of a recording session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecorderPhase {
    /// Microphone permission has not been granted.
    #[default]
    NoPermission,
    /// Permission granted, not recording.
    Idle,
    /// Actively buffering audio chunks.
    Recording,
    /// A finished clip is ready to submit.
    Ready,
}

impl std::fmt::Display for RecorderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPermission => write!(f, "no_permission"),
            Self::Idle => write!(f, "idle"),
            Self::Recording => write!(f, "recording"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// A finished recording: one contiguous buffer plus its measured duration.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedClip {
    /// MIME type the audio was captured with.
    pub mime_type: String,
    /// The assembled audio bytes.
    pub data: Vec<u8>,
    /// Wall-clock duration of the recording, in seconds.
    pub duration_seconds: f64,
}

impl RecordedClip {
    /// Encodes the clip as a data URI for submission to a flow.
    #[must_use]
    pub fn data_uri(&self) -> DataUri {
        DataUri::from_bytes(self.mime_type.clone(), self.data.clone())
    }
}

/// An audio capture session for one reading-assessment page.
///
/// Holds at most one in-progress buffer and at most one finished clip;
/// starting a new recording discards both.
#[derive(Debug, Default)]
pub struct RecordingSession {
    phase: RecorderPhase,
    mime_type: String,
    chunks: Vec<Vec<u8>>,
    started_at: Option<DateTime<Utc>>,
    clip: Option<RecordedClip>,
}

impl RecordingSession {
    /// Creates a session in the `NoPermission` phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> RecorderPhase {
        self.phase
    }

    /// Returns `true` if audio is currently being buffered.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.phase == RecorderPhase::Recording
    }

    /// Records that microphone permission was granted.
    ///
    /// Valid only from `NoPermission`; granting twice is a no-op error the
    /// caller can ignore safely.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] from any other phase.
    pub fn grant_permission(&mut self) -> Result<()> {
        match self.phase {
            RecorderPhase::NoPermission => {
                self.phase = RecorderPhase::Idle;
                Ok(())
            }
            other => Err(FlowError::invalid_transition(other, RecorderPhase::Idle)),
        }
    }

    /// Records that microphone permission was denied.
    ///
    /// Leaves the session in `NoPermission`: the feature stays disabled
    /// but nothing crashes. Any buffered audio is discarded.
    pub fn deny_permission(&mut self) {
        self.phase = RecorderPhase::NoPermission;
        self.chunks.clear();
        self.started_at = None;
        self.clip = None;
    }

    /// Begins a new recording at `now` with the given capture MIME type.
    ///
    /// Valid from `Idle` or `Ready`; starting from `Ready` discards the
    /// previous clip entirely, so a later submit sends only the latest
    /// recording's bytes and duration.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] from `NoPermission` or
    /// while already recording.
    pub fn start(&mut self, mime_type: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        match self.phase {
            RecorderPhase::Idle | RecorderPhase::Ready => {
                self.phase = RecorderPhase::Recording;
                self.mime_type = mime_type.into();
                self.chunks.clear();
                self.clip = None;
                self.started_at = Some(now);
                Ok(())
            }
            other => Err(FlowError::invalid_transition(
                other,
                RecorderPhase::Recording,
            )),
        }
    }

    /// Buffers one chunk of captured audio.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] if not recording.
    pub fn push_chunk(&mut self, chunk: Vec<u8>) -> Result<()> {
        if self.phase != RecorderPhase::Recording {
            return Err(FlowError::invalid_transition(
                self.phase,
                RecorderPhase::Recording,
            ));
        }
        self.chunks.push(chunk);
        Ok(())
    }

    /// Stops recording at `now`, assembling the chunks into one clip.
    ///
    /// The duration is `now - start` in wall-clock seconds, measured here
    /// on the client side; the scoring flow trusts it as given.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] if not recording.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<&RecordedClip> {
        if self.phase != RecorderPhase::Recording {
            return Err(FlowError::invalid_transition(
                self.phase,
                RecorderPhase::Ready,
            ));
        }

        let started_at = self.started_at.take().ok_or_else(|| {
            FlowError::invalid_transition(RecorderPhase::Recording, RecorderPhase::Ready)
        })?;
        let elapsed = now - started_at;
        #[allow(clippy::cast_precision_loss)]
        let duration_seconds = elapsed.num_milliseconds() as f64 / 1000.0;

        let data: Vec<u8> = self.chunks.drain(..).flatten().collect();
        self.clip = Some(RecordedClip {
            mime_type: self.mime_type.clone(),
            data,
            duration_seconds,
        });
        self.phase = RecorderPhase::Ready;

        // The clip was just stored; phase() == Ready guarantees it exists.
        self.clip.as_ref().ok_or_else(|| {
            FlowError::invalid_transition(RecorderPhase::Ready, RecorderPhase::Ready)
        })
    }

    /// Returns the finished clip, if the session is `Ready`.
    #[must_use]
    pub const fn clip(&self) -> Option<&RecordedClip> {
        self.clip.as_ref()
    }

    /// Releases the session on page teardown.
    ///
    /// Discards any in-progress buffer and finished clip; permission is
    /// retained, so the session returns to `Idle` (or stays in
    /// `NoPermission` if it was never granted).
    pub fn release(&mut self) {
        if self.phase != RecorderPhase::NoPermission {
            self.phase = RecorderPhase::Idle;
        }
        self.chunks.clear();
        self.started_at = None;
        self.clip = None;
    }
}
