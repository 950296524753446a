//! # Core Configuration Module
//!
//! Collects the host capabilities a player needs before it can be created.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance holding every bridge the player core talks to. It enforces
//! fail-fast validation so that a missing capability is reported at startup
//! with an actionable message rather than surfacing as a silent no-op later.
//!
//! ## Required Dependencies
//!
//! - `RenderSurface` - Drawable target the video is attached to
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `AudioFocus` - System audio focus (default: none, focus is not managed)
//! - `Clock` - Time source for timer deadlines (default: `SystemClock`)
//! - `LoggerSink` - Host logging pipeline (default: none)
//!
//! When the `desktop-shims` feature is enabled, a `HeadlessSurface` from
//! `bridge-desktop` is injected if no render surface is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use bridge_desktop::{HeadlessSurface, SharedAudioFocus};
//! use std::sync::Arc;
//!
//! let focus = SharedAudioFocus::new();
//! let config = CoreConfig::builder()
//!     .render_surface(Arc::new(HeadlessSurface::new()))
//!     .audio_focus(Arc::new(focus.client()))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AudioFocus, Clock, LoggerSink, RenderSurface, SystemClock};
use std::sync::Arc;

/// Upper bound for the event bus buffer.
const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Host capabilities shared by every player created from this config.
#[derive(Clone)]
pub struct CoreConfig {
    /// Surface the video is rendered into (required)
    pub render_surface: Arc<dyn RenderSurface>,

    /// Audio focus capability (optional)
    pub audio_focus: Option<Arc<dyn AudioFocus>>,

    /// Time source for timer deadlines
    pub clock: Arc<dyn Clock>,

    /// Host logging pipeline (optional)
    pub logger_sink: Option<Arc<dyn LoggerSink>>,

    /// Capacity of the player event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("render_surface", &"RenderSurface { ... }")
            .field(
                "audio_focus",
                &self.audio_focus.as_ref().map(|_| "AudioFocus { ... }"),
            )
            .field("clock", &"Clock { ... }")
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn render_surface_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "RenderSurface".to_string(),
        message: "A RenderSurface implementation is required to attach video output. \
                 Desktop: enable the 'desktop-shims' feature to use HeadlessSurface. \
                 Mobile: wrap the platform view (SurfaceView/TextureView, AVPlayerLayer)."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_render_surface() -> Result<Arc<dyn RenderSurface>> {
    use bridge_desktop::HeadlessSurface;

    tracing::debug!("No RenderSurface provided, using HeadlessSurface");
    let surface: Arc<dyn RenderSurface> = Arc::new(HeadlessSurface::new());
    Ok(surface)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_render_surface() -> Result<Arc<dyn RenderSurface>> {
    Err(render_surface_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    render_surface: Option<Arc<dyn RenderSurface>>,
    audio_focus: Option<Arc<dyn AudioFocus>>,
    clock: Option<Arc<dyn Clock>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the render surface implementation (required).
    pub fn render_surface(mut self, surface: Arc<dyn RenderSurface>) -> Self {
        self.render_surface = Some(surface);
        self
    }

    /// Sets the audio focus implementation (optional).
    ///
    /// Without one, players never request or abandon focus.
    pub fn audio_focus(mut self, focus: Arc<dyn AudioFocus>) -> Self {
        self.audio_focus = Some(focus);
        self
    }

    /// Sets the clock used for timer deadlines.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the logger sink for host log forwarding (optional).
    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`](crate::events::DEFAULT_EVENT_BUFFER_SIZE)
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when no render surface is provided
    /// and no default is available, and [`Error::Config`] when validation fails.
    pub fn build(self) -> Result<CoreConfig> {
        let render_surface = match self.render_surface {
            Some(surface) => surface,
            None => provide_default_render_surface()?,
        };

        let config = CoreConfig {
            render_surface,
            audio_focus: self.audio_focus,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            logger_sink: self.logger_sink,
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}
