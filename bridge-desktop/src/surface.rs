use bridge_traits::render::{RenderSurface, SurfaceHandle};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct SurfaceState {
    creating: bool,
    handle: Option<SurfaceHandle>,
    display_size: Option<(u32, u32)>,
}

/// Render surface whose lifecycle is driven explicitly by the host.
///
/// Desktop hosts without a native video view (CLI tools, audio-only players,
/// tests) use this to satisfy the `RenderSurface` contract. Call
/// [`begin_create`](Self::begin_create) / [`finish_create`](Self::finish_create)
/// / [`destroy`](Self::destroy) from the windowing layer and report the same
/// transitions to the player.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    state: Mutex<SurfaceState>,
}

impl HeadlessSurface {
    /// A surface that does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that is already created and usable.
    pub fn ready(handle: SurfaceHandle) -> Self {
        let surface = Self::new();
        surface.finish_create(handle);
        surface
    }

    pub fn begin_create(&self) {
        let mut state = self.state.lock();
        state.creating = true;
        state.handle = None;
    }

    pub fn finish_create(&self, handle: SurfaceHandle) {
        let mut state = self.state.lock();
        state.creating = false;
        state.handle = Some(handle);
        debug!(handle = handle.raw(), "Headless surface created");
    }

    pub fn destroy(&self) {
        let mut state = self.state.lock();
        state.creating = false;
        state.handle = None;
        debug!("Headless surface destroyed");
    }

    /// Last size pushed by the player, if any.
    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.state.lock().display_size
    }
}

impl RenderSurface for HeadlessSurface {
    fn is_usable(&self) -> bool {
        self.state.lock().handle.is_some()
    }

    fn is_being_created(&self) -> bool {
        self.state.lock().creating
    }

    fn display_handle(&self) -> Option<SurfaceHandle> {
        self.state.lock().handle
    }

    fn apply_display_size(&self, width: u32, height: u32) {
        self.state.lock().display_size = Some((width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        let surface = HeadlessSurface::new();
        assert!(!surface.is_usable());
        assert!(!surface.is_being_created());

        surface.begin_create();
        assert!(surface.is_being_created());
        assert!(!surface.is_usable());

        surface.finish_create(SurfaceHandle::new(9));
        assert!(surface.is_usable());
        assert!(!surface.is_being_created());
        assert_eq!(surface.display_handle(), Some(SurfaceHandle::new(9)));

        surface.destroy();
        assert!(!surface.is_usable());
        assert_eq!(surface.display_handle(), None);
    }

    #[test]
    fn records_display_size() {
        let surface = HeadlessSurface::ready(SurfaceHandle::new(1));
        assert_eq!(surface.display_size(), None);

        surface.apply_display_size(1280, 720);
        assert_eq!(surface.display_size(), Some((1280, 720)));
    }
}
