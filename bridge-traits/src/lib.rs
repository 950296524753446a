//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the player core and the host. Each
//! trait represents a capability the core needs but cannot provide itself
//! because it lives in the host UI toolkit or the operating system.
//!
//! ## Traits
//!
//! ### Rendering & Audio
//! - [`RenderSurface`](render::RenderSurface) - Drawable target with its own creation/destruction lifecycle
//! - [`AudioFocus`](focus::AudioFocus) - Request/abandon the system audio focus
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Monotonic time source for timer deadlines
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop / headless | `bridge-desktop` | ✅ |
//! | Android  | host app (JNI) | 📋 Planned |
//! | iOS      | host app | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability is
//! missing:
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder().build();
//! // Err(CapabilityMissing { capability: "RenderSurface", .. })
//! ```
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` (via
//! [`PlatformSendSync`](platform::PlatformSendSync)) because the player's
//! control task may run on any runtime worker thread.

pub mod error;
pub mod focus;
pub mod log;
pub mod platform;
pub mod render;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use focus::AudioFocus;
pub use render::{RenderSurface, SurfaceHandle};
pub use log::{LogEntry, LogLevel, LoggerSink};
pub use time::{Clock, ManualClock, SystemClock};
