//! Playback requests.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// What to play and where to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackRequest {
    /// URI-like media source (`https://...`, `file://...` or a plain path).
    pub source: String,
    /// Position to seek to once the media geometry is known. `0` means start
    /// from the beginning.
    #[serde(default)]
    pub resume_position_ms: u64,
}

impl PlaybackRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            resume_position_ms: 0,
        }
    }

    pub fn with_resume_position(mut self, position_ms: u64) -> Self {
        self.resume_position_ms = position_ms;
        self
    }

    /// Reject requests that could never reach an engine.
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(PlaybackError::InvalidRequest(
                "media source is empty".to_string(),
            ));
        }
        Ok(())
    }
}
