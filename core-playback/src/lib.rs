//! # Player Lifecycle Core
//!
//! Coordinates a media engine, a render surface and host listeners into a
//! predictable playback lifecycle.
//!
//! ## Overview
//!
//! This crate handles:
//! - The [`MediaPlayer`] state machine: loading, deferred start until the
//!   render surface exists, pause/resume, debounced seek notifications and
//!   the loading timeout
//! - Error classification into retryable and non-retryable failures
//! - Session fencing so callbacks from a replaced engine are dropped
//! - Aspect-fit display sizing ([`layout`])
//! - An async driver task with a cloneable [`PlayerHandle`] ([`driver`])
//! - A symphonia-backed engine for local files (feature `decoder-symphonia`)
//!
//! ## Notification order
//!
//! A successful session always reports `StartPlay`, `Loading`, then
//! `FinishLoading`. Seeks report `StartSeek` only if the engine takes longer
//! than the configured start delay, and `SeekComplete` once the settle delay
//! has passed after the engine finished.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod layout;
pub mod listener;
pub mod player;
pub mod request;
pub mod state;
pub mod timer;

pub use config::PlayerConfig;
pub use driver::{PlayerHandle, WeakPlayerHandle};
pub use engine::{EngineEvent, EngineEventSink, EngineFactory, MediaEngine, SessionEvent, SessionId};
pub use error::{PlaybackError, Result};
pub use layout::{calc_display_size, DisplaySize};
pub use listener::{BusListener, ListenerSet, PlayerListener};
pub use player::{MediaPlayer, PlayerSnapshot};
pub use request::PlaybackRequest;
pub use state::PlayerState;
pub use timer::{TimerKey, TimerQueue};

#[cfg(feature = "decoder-symphonia")]
pub use engine::symphonia::{SymphoniaEngine, SymphoniaEngineFactory};
