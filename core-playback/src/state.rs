//! Player lifecycle states.

use serde::{Deserialize, Serialize};

/// Authoritative state of a player. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// No media has been requested yet.
    #[default]
    Idle,
    /// A source is bound and the engine is preparing it.
    Loading,
    /// Prepared (or completed) but not rendering.
    Ready,
    Playing,
    Paused,
    Stopped,
    /// Loading failed or the engine reported an error. Only `play` recovers.
    Error,
    /// Terminal.
    Destroyed,
}

impl PlayerState {
    /// Returns `true` if this state can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Destroyed)
    }
}
