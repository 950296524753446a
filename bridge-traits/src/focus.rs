//! Audio focus abstraction.
//!
//! Mirrors the platform notion of "who may play sound right now". The player
//! requests focus when playback starts or resumes and abandons it when playback
//! pauses, stops, fails, completes or is destroyed. Focus *loss* is an inbound
//! event: the host reports it to the player, which pauses.

use crate::platform::PlatformSendSync;

/// Injected audio focus capability.
#[cfg_attr(test, mockall::automock)]
pub trait AudioFocus: PlatformSendSync {
    /// Ask for focus. Returns `true` when granted.
    fn request(&self) -> bool;

    /// Give focus back. Calling this without holding focus is harmless.
    fn abandon(&self);
}
