//! Render surface abstraction.
//!
//! A render surface is the host-provided drawable target (a `SurfaceView`,
//! `TextureView`, window layer or offscreen texture). The host creates and
//! destroys it on its own schedule; the player only queries it and forwards
//! lifecycle transitions reported through `on_surface_created` /
//! `on_surface_destroyed`.

use crate::platform::PlatformSendSync;

/// Opaque handle the host hands to media engines so they can draw into the
/// surface. The core never interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

impl SurfaceHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Host render surface.
///
/// # Platform Notes
///
/// - **Android**: `SurfaceHolder` callbacks drive `is_being_created` and
///   `is_usable`; `apply_display_size` updates the view's layout params.
/// - **Desktop**: usually always usable; `apply_display_size` resizes the
///   video quad.
#[cfg_attr(test, mockall::automock)]
pub trait RenderSurface: PlatformSendSync {
    /// Whether the surface exists and can accept frames right now.
    fn is_usable(&self) -> bool;

    /// Whether creation has started but not yet completed.
    fn is_being_created(&self) -> bool;

    /// Handle passed to the engine, `None` while the surface does not exist.
    fn display_handle(&self) -> Option<SurfaceHandle>;

    /// Resize the visible video rectangle to `width` x `height` pixels.
    fn apply_display_size(&self, width: u32, height: u32);
}
