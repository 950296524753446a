//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and headless hosts
//! (macOS, Windows, Linux, CI).
//!
//! ## Overview
//!
//! - `RenderSurface` as [`HeadlessSurface`], a host-driven surface whose
//!   lifecycle is toggled explicitly
//! - `AudioFocus` as [`SharedAudioFocus`] clients, an in-process arbiter that
//!   hands focus to one player at a time and notifies the previous holder
//! - `Clock` as [`TokioClock`], which follows Tokio's (pausable) clock so
//!   timer deadlines line up with `tokio::time::sleep_until`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HeadlessSurface, SharedAudioFocus, TokioClock};
//! use bridge_traits::SurfaceHandle;
//! use std::sync::Arc;
//!
//! let surface = Arc::new(HeadlessSurface::ready(SurfaceHandle::new(1)));
//! let focus = SharedAudioFocus::new();
//! let client = Arc::new(focus.client());
//! let clock = Arc::new(TokioClock);
//! ```

mod clock;
mod focus;
mod surface;

pub use clock::TokioClock;
pub use focus::{FocusClient, SharedAudioFocus};
pub use surface::HeadlessSurface;
