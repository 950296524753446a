//! # Media Engine Contract
//!
//! The boundary between the player state machine and a platform decoder.
//!
//! ## Overview
//!
//! An engine wraps one decoder/player primitive for exactly one session. It
//! has no business logic: the state machine decides when to prepare, start,
//! pause or seek, and the engine reports what happened through a fixed set of
//! [`EngineEvent`]s pushed into an [`EngineEventSink`].
//!
//! ```text
//! ┌──────────────┐  create(session, sink)  ┌───────────────┐
//! │ MediaPlayer  ├────────────────────────>│ EngineFactory │
//! │              │                         └───────┬───────┘
//! │              │  set_source / start ...         │
//! │              ├────────────────────────>┌───────▼───────┐
//! │              │                         │  MediaEngine  │
//! │              │<────────────────────────┤               │
//! └──────────────┘  SessionEvent (mpsc)    └───────────────┘
//! ```
//!
//! ## Rules for implementors
//!
//! - Never call back synchronously. Every event goes through the sink, even
//!   when it is known at call time.
//! - `prepare_async` returns `Err` only when preparation cannot begin; later
//!   failures are `EngineEvent::Error`.
//! - `release` is idempotent and turns every later call into a no-op.
//! - Audio-only engines report `VideoSizeChanged { width: 0, height: 0 }` after
//!   preparing so the player knows the geometry is settled.

#[cfg(feature = "decoder-symphonia")]
pub mod symphonia;

use crate::error::Result;
use crate::request::PlaybackRequest;
use bridge_traits::platform::PlatformSend;
use bridge_traits::render::SurfaceHandle;
use std::fmt;
use tokio::sync::mpsc;

/// Decoder error codes, following the platform media framework convention.
pub mod codes {
    /// Unspecified engine error (`what`).
    pub const MEDIA_ERROR_UNKNOWN: i32 = 1;
    /// The media server process died (`what`).
    pub const MEDIA_ERROR_SERVER_DIED: i32 = 100;
    /// File or network I/O failure (`extra`).
    pub const MEDIA_ERROR_IO: i32 = -1004;
    /// Bitstream does not conform to its container or codec (`extra`).
    pub const MEDIA_ERROR_MALFORMED: i32 = -1007;
    /// Container or codec not supported (`extra`).
    pub const MEDIA_ERROR_UNSUPPORTED: i32 = -1010;
    /// An operation took too long (`extra`).
    pub const MEDIA_ERROR_TIMED_OUT: i32 = -110;
    /// Code the player uses for failures it detects itself.
    pub const PLAYER_ERROR: i32 = -1;
}

/// Human-readable form of an engine error pair.
///
/// ```
/// use core_playback::engine::describe_error;
///
/// assert_eq!(
///     describe_error(1, -1010),
///     "what = 1 (MEDIA_ERROR_UNKNOWN), extra = -1010 (MEDIA_ERROR_UNSUPPORTED)"
/// );
/// ```
pub fn describe_error(what: i32, extra: i32) -> String {
    let what_name = match what {
        codes::MEDIA_ERROR_UNKNOWN => "MEDIA_ERROR_UNKNOWN",
        codes::MEDIA_ERROR_SERVER_DIED => "MEDIA_ERROR_SERVER_DIED",
        _ => "!",
    };
    let extra_name = match extra {
        codes::MEDIA_ERROR_UNSUPPORTED => "MEDIA_ERROR_UNSUPPORTED",
        codes::MEDIA_ERROR_MALFORMED => "MEDIA_ERROR_MALFORMED",
        codes::MEDIA_ERROR_IO => "MEDIA_ERROR_IO",
        codes::MEDIA_ERROR_TIMED_OUT => "MEDIA_ERROR_TIMED_OUT",
        _ => "!",
    };
    format!(
        "what = {} ({}), extra = {} ({})",
        what, what_name, extra, extra_name
    )
}

/// Identifies one engine instance. Strictly increasing per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callbacks an engine may deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Prepared,
    Error { what: i32, extra: i32 },
    Completion,
    SeekComplete,
    /// Buffered share of the media, in percent.
    BufferingUpdate(i32),
    VideoSizeChanged { width: u32, height: u32 },
}

/// An engine event tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: EngineEvent,
}

/// Channel end handed to an engine for reporting events.
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EngineEventSink {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Queue an event for the player. Returns `false` once the player is gone.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx
            .send(SessionEvent {
                session: self.session,
                event,
            })
            .is_ok()
    }
}

/// One decoder session, exclusively owned by the state machine.
///
/// Methods must not block; long work belongs on another thread with the
/// result posted through the sink.
pub trait MediaEngine: PlatformSend {
    /// Bind the media to play.
    fn set_source(&mut self, request: &PlaybackRequest) -> Result<()>;

    /// Begin preparing. Completion arrives as `EngineEvent::Prepared`.
    fn prepare_async(&mut self) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Seek to `position_ms`. Completion arrives as `EngineEvent::SeekComplete`.
    fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    /// Set output volume, `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Attach or detach the render target.
    fn set_display(&mut self, handle: Option<SurfaceHandle>);

    fn is_playing(&self) -> bool;

    /// Media duration, `0` when unknown.
    fn duration_ms(&self) -> u64;

    fn current_position_ms(&self) -> u64;

    /// Free decoder resources. Idempotent.
    fn release(&mut self);
}

/// Creates one engine per playback session.
pub trait EngineFactory: PlatformSend + 'static {
    type Engine: MediaEngine + 'static;

    /// Build a fresh engine that reports through `sink`.
    fn create(&self, sink: EngineEventSink) -> Result<Self::Engine>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_known_codes() {
        assert_eq!(
            describe_error(100, -1004),
            "what = 100 (MEDIA_ERROR_SERVER_DIED), extra = -1004 (MEDIA_ERROR_IO)"
        );
        assert_eq!(
            describe_error(1, -110),
            "what = 1 (MEDIA_ERROR_UNKNOWN), extra = -110 (MEDIA_ERROR_TIMED_OUT)"
        );
    }

    #[test]
    fn unknown_codes_are_marked() {
        assert_eq!(describe_error(7, 42), "what = 7 (!), extra = 42 (!)");
    }

    #[test]
    fn session_ids_increase() {
        let first = SessionId::new(1);
        assert!(first.next() > first);
        assert_eq!(first.next().raw(), 2);
        assert_eq!(first.to_string(), "#1");
    }

    #[test]
    fn sink_tags_events_and_reports_closed_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EngineEventSink::new(SessionId::new(3), tx);

        assert!(sink.emit(EngineEvent::Prepared));
        let received = rx.try_recv().unwrap();
        assert_eq!(received.session, SessionId::new(3));
        assert_eq!(received.event, EngineEvent::Prepared);

        drop(rx);
        assert!(!sink.emit(EngineEvent::Completion));
    }
}
