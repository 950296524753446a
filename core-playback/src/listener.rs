//! # Player Listeners
//!
//! Observers of a player's notification sequence.

use bridge_traits::platform::PlatformSendSync;
use core_runtime::events::{EventBus, PlayerEvent};
use std::sync::Arc;
use tracing::trace;

/// Receives player notifications.
///
/// Every method has a no-op default, so implementors override only what they
/// care about. Callbacks run synchronously on the player's control task and
/// must return quickly.
pub trait PlayerListener: PlatformSendSync {
    fn on_loading(&self) {}

    fn on_load_failed(&self) {}

    fn on_finish_loading(&self) {}

    fn on_error(&self, _code: i32, _can_reload: bool, _message: &str) {}

    fn on_start_play(&self) {}

    fn on_play_complete(&self) {}

    fn on_start_seek(&self) {}

    fn on_seek_complete(&self) {}

    fn on_resumed(&self) {}

    fn on_paused(&self) {}

    fn on_stopped(&self) {}

    /// Route a notification in value form to the matching callback.
    fn on_event(&self, event: &PlayerEvent) {
        match event {
            PlayerEvent::Loading => self.on_loading(),
            PlayerEvent::LoadFailed => self.on_load_failed(),
            PlayerEvent::FinishLoading => self.on_finish_loading(),
            PlayerEvent::Error {
                code,
                can_reload,
                message,
            } => self.on_error(*code, *can_reload, message),
            PlayerEvent::StartPlay => self.on_start_play(),
            PlayerEvent::PlayComplete => self.on_play_complete(),
            PlayerEvent::StartSeek => self.on_start_seek(),
            PlayerEvent::SeekComplete => self.on_seek_complete(),
            PlayerEvent::Resumed => self.on_resumed(),
            PlayerEvent::Paused => self.on_paused(),
            PlayerEvent::Stopped => self.on_stopped(),
        }
    }
}

/// Ordered listener collection. Duplicates are kept and notified twice.
#[derive(Default, Clone)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn PlayerListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Arc<dyn PlayerListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener in insertion order.
    ///
    /// Iterates over a snapshot, so the set seen by one notification is fixed
    /// when it starts.
    pub fn notify(&self, event: &PlayerEvent) {
        let snapshot = self.listeners.clone();
        trace!(event = ?event, listeners = snapshot.len(), "Notifying listeners");
        for listener in snapshot {
            listener.on_event(event);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Republishes every notification on an [`EventBus`].
#[derive(Debug, Clone)]
pub struct BusListener {
    bus: EventBus,
}

impl BusListener {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    fn publish(&self, event: PlayerEvent) {
        // No subscribers is not an error for a broadcast.
        let _ = self.bus.emit(event);
    }
}

impl PlayerListener for BusListener {
    fn on_event(&self, event: &PlayerEvent) {
        self.publish(event.clone());
    }
}
