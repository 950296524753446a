//! # Playback Error Types
//!
//! Error taxonomy for the player state machine and its engines.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during playback operations.
///
/// Engine failures never escape the state machine as `Err` values; they are
/// converted into listener notifications. The variants still exist so engines,
/// the driver and the host share one vocabulary.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Request Errors
    // ========================================================================
    /// The playback request was rejected before reaching the engine.
    #[error("Invalid playback request: {0}")]
    InvalidRequest(String),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// Creating the engine, binding the source or starting preparation failed.
    #[error("Engine failed to start: {0}")]
    EngineStartFailure(String),

    /// The engine reported an asynchronous error.
    #[error("Engine error: {message}")]
    EngineRuntimeError {
        what: i32,
        extra: i32,
        message: String,
    },

    /// The engine did not report prepared before the loading timeout.
    #[error("Media did not finish loading within {0:?}")]
    LoadTimeout(Duration),

    /// A control call (start, pause, seek...) on a live engine failed.
    #[error("Engine {operation} failed: {message}")]
    EngineControl {
        operation: &'static str,
        message: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The player was destroyed and accepts no further work.
    #[error("Player has been destroyed")]
    Destroyed,

    /// The task driving the player is gone.
    #[error("Player task is no longer running")]
    PlayerClosed,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Invalid player configuration: {0}")]
    InvalidConfig(String),

    /// Failure inside a decoder implementation, for engines to wrap their
    /// own errors.
    #[error("Decoder error: {0}")]
    Decoder(String),
}

impl PlaybackError {
    /// Code reported to listeners through `on_error`.
    ///
    /// Runtime errors carry the engine's `what` code; every other failure the
    /// player reports uses `-1`.
    pub fn code(&self) -> i32 {
        match self {
            PlaybackError::EngineRuntimeError { what, .. } => *what,
            _ => -1,
        }
    }

    /// Whether retrying the same source may succeed.
    ///
    /// `non_retryable` lists engine codes that mark the media itself as bad.
    pub fn can_reload(&self, non_retryable: &[i32]) -> bool {
        match self {
            PlaybackError::EngineStartFailure(_)
            | PlaybackError::InvalidRequest(_)
            | PlaybackError::Destroyed
            | PlaybackError::InvalidConfig(_) => false,
            PlaybackError::EngineRuntimeError { what, extra, .. } => {
                !non_retryable.contains(what) && !non_retryable.contains(extra)
            }
            _ => true,
        }
    }

    /// Attribute `self` to a failed `operation` on the engine.
    ///
    /// Errors the engine already reported as control failures keep their
    /// own operation and message.
    pub fn into_control(self, operation: &'static str) -> PlaybackError {
        match self {
            err @ PlaybackError::EngineControl { .. } => err,
            other => PlaybackError::EngineControl {
                operation,
                message: other.to_string(),
            },
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_NON_RETRYABLE: &[i32] = &[-1010, -1007];

    #[test]
    fn runtime_error_uses_engine_code() {
        let err = PlaybackError::EngineRuntimeError {
            what: 100,
            extra: -1004,
            message: "server died".into(),
        };
        assert_eq!(err.code(), 100);
        assert!(err.can_reload(DEFAULT_NON_RETRYABLE));
    }

    #[test]
    fn unsupported_media_is_not_retryable() {
        let err = PlaybackError::EngineRuntimeError {
            what: 1,
            extra: -1010,
            message: "unsupported".into(),
        };
        assert!(!err.can_reload(DEFAULT_NON_RETRYABLE));
        assert!(err.can_reload(&[]));
    }

    #[test]
    fn start_failures_are_final() {
        let err = PlaybackError::EngineStartFailure("no decoder".into());
        assert_eq!(err.code(), -1);
        assert!(!err.can_reload(&[]));
    }

    #[test]
    fn control_failures_are_retryable() {
        let err = PlaybackError::EngineControl {
            operation: "seek",
            message: "illegal state".into(),
        };
        assert_eq!(err.code(), -1);
        assert!(err.can_reload(DEFAULT_NON_RETRYABLE));
        assert_eq!(err.to_string(), "Engine seek failed: illegal state");
    }

    #[test]
    fn control_failures_are_not_wrapped_twice() {
        let err = PlaybackError::EngineControl {
            operation: "seek",
            message: "media not prepared".into(),
        };
        assert_eq!(
            err.into_control("seek").to_string(),
            "Engine seek failed: media not prepared"
        );

        let err = PlaybackError::Decoder("pause rejected".into()).into_control("pause");
        assert_eq!(
            err.to_string(),
            "Engine pause failed: Decoder error: pause rejected"
        );
    }
}
