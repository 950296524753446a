//! # Player Configuration
//!
//! Timer durations and policy knobs for the player state machine.

use crate::engine::codes;
use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Player configuration.
///
/// Every field has a serde default, so a partial JSON document (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// How long the engine may take to report prepared before the player
    /// gives up with `on_load_failed`.
    ///
    /// Default: 30 000 ms.
    #[serde(default = "default_loading_timeout_ms")]
    pub loading_timeout_ms: u64,

    /// Delay after a seek request before the player announces a slow seek
    /// with `on_start_seek`.
    ///
    /// Default: 300 ms.
    #[serde(default = "default_seek_start_delay_ms")]
    pub seek_start_delay_ms: u64,

    /// Quiet period after the engine's seek-complete before `on_seek_complete`
    /// is reported. Repeated completions inside the window coalesce.
    ///
    /// Default: 100 ms.
    #[serde(default = "default_seek_settle_delay_ms")]
    pub seek_settle_delay_ms: u64,

    /// Resume playback when the render surface comes back.
    ///
    /// Default: true.
    #[serde(default = "default_auto_resume")]
    pub auto_resume: bool,

    /// Engine error codes (`what` or `extra`) that make an error final.
    ///
    /// Default: `[UNSUPPORTED, MALFORMED]`.
    #[serde(default = "default_non_retryable_codes")]
    pub non_retryable_codes: Vec<i32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            loading_timeout_ms: default_loading_timeout_ms(),
            seek_start_delay_ms: default_seek_start_delay_ms(),
            seek_settle_delay_ms: default_seek_settle_delay_ms(),
            auto_resume: default_auto_resume(),
            non_retryable_codes: default_non_retryable_codes(),
        }
    }
}

impl PlayerConfig {
    /// Parse a configuration from JSON, filling in defaults, then validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlaybackError::InvalidConfig(format!("malformed JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.loading_timeout_ms == 0 {
            return Err(PlaybackError::InvalidConfig(
                "loading_timeout_ms must be > 0".to_string(),
            ));
        }

        if self.seek_settle_delay_ms > self.loading_timeout_ms {
            return Err(PlaybackError::InvalidConfig(
                "seek_settle_delay_ms cannot exceed loading_timeout_ms".to_string(),
            ));
        }

        if self.seek_start_delay_ms > self.loading_timeout_ms {
            return Err(PlaybackError::InvalidConfig(
                "seek_start_delay_ms cannot exceed loading_timeout_ms".to_string(),
            ));
        }

        Ok(())
    }

    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }

    pub fn seek_start_delay(&self) -> Duration {
        Duration::from_millis(self.seek_start_delay_ms)
    }

    pub fn seek_settle_delay(&self) -> Duration {
        Duration::from_millis(self.seek_settle_delay_ms)
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_loading_timeout_ms() -> u64 {
    30_000
}

fn default_seek_start_delay_ms() -> u64 {
    300
}

fn default_seek_settle_delay_ms() -> u64 {
    100
}

fn default_auto_resume() -> bool {
    true
}

fn default_non_retryable_codes() -> Vec<i32> {
    vec![codes::MEDIA_ERROR_UNSUPPORTED, codes::MEDIA_ERROR_MALFORMED]
}
