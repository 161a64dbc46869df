//! Error taxonomy surfaced by the audio engine and the planet catalogue.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Broad category of an engine failure; decides which recovery step runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Engine or output context setup failed.
    Initialization,
    /// Start/stop/schedule/trigger failed.
    Playback,
    /// Output device suspended and could not be resumed.
    Context,
    /// Asset fetch failed.
    Network,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Initialization => "initialization",
            ErrorKind::Playback => "playback",
            ErrorKind::Context => "context",
            ErrorKind::Network => "network",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An engine-level failure as seen by subscribers.
///
/// Only errors with `recoverable == true` go through the retry policy before
/// being surfaced.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{kind} error: {message}")]
pub struct AudioError {
    pub kind: ErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub recoverable: bool,
}

impl AudioError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
            recoverable,
        }
    }

    pub fn recoverable(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, true)
    }

    pub fn fatal(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, false)
    }
}

/// Failure reported by an audio backend implementation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("output context could not be resumed: {0}")]
    Resume(String),
    #[error("synth creation failed: {0}")]
    Synth(String),
    #[error("tone trigger failed: {0}")]
    Trigger(String),
    #[error("asset fetch failed: {0}")]
    Fetch(String),
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Classify into the engine taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Unavailable(_) => ErrorKind::Initialization,
            BackendError::Resume(_) => ErrorKind::Context,
            BackendError::Synth(_) | BackendError::Trigger(_) => ErrorKind::Playback,
            BackendError::Fetch(_) => ErrorKind::Network,
            BackendError::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Convert into an engine error. Synth creation failures only ever skip
    /// one planet, so they are never retried.
    pub fn into_audio_error(self) -> AudioError {
        let recoverable = !matches!(self, BackendError::Synth(_));
        AudioError::new(self.kind(), self.to_string(), recoverable)
    }
}

/// Invalid static planet data.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlanetError {
    #[error("planet `{id}`: distance from sun must be > 0 AU, got {value}")]
    Distance { id: String, value: f64 },
    #[error("planet `{id}`: orbital period must be > 0 days, got {value}")]
    Period { id: String, value: f64 },
    #[error("planet `{id}`: radius must be > 0, got {value}")]
    Radius { id: String, value: f64 },
    #[error("duplicate planet id `{0}`")]
    Duplicate(String),
}
