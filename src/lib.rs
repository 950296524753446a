//! Workspace umbrella crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-service`, `core-playback`). Host applications can
//! depend on `mediaplayer-workspace` and enable the documented features without
//! wiring each crate individually:
//!
//! - `desktop-shims` (default): headless render surface, in-process audio focus
//!   and tokio clock from `bridge-desktop`.
//! - `decoder-symphonia`: the symphonia-backed media engine.

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "decoder-symphonia")]
pub use core_playback as playback;
