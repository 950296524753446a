use bridge_traits::focus::AudioFocus;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

type LossHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct FocusState {
    next_id: u64,
    owner: Option<u64>,
    hooks: HashMap<u64, LossHook>,
}

/// In-process audio focus arbiter.
///
/// Desktop platforms have no system-wide focus service, so players living in
/// the same process share one of these. Only one [`FocusClient`] holds focus
/// at a time; granting focus to a client fires the loss hook of the previous
/// holder.
#[derive(Clone, Default)]
pub struct SharedAudioFocus {
    state: Arc<Mutex<FocusState>>,
}

impl SharedAudioFocus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new participant.
    pub fn client(&self) -> FocusClient {
        let mut state = self.state.lock();
        state.next_id += 1;
        FocusClient {
            id: state.next_id,
            arbiter: self.clone(),
        }
    }

    /// Id of the client currently holding focus.
    pub fn owner(&self) -> Option<u64> {
        self.state.lock().owner
    }
}

impl std::fmt::Debug for SharedAudioFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SharedAudioFocus")
            .field("owner", &state.owner)
            .field("clients_with_hooks", &state.hooks.len())
            .finish()
    }
}

/// One participant of a [`SharedAudioFocus`].
pub struct FocusClient {
    id: u64,
    arbiter: SharedAudioFocus,
}

impl FocusClient {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Install the callback run when another client takes focus away.
    pub fn on_loss<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.arbiter
            .state
            .lock()
            .hooks
            .insert(self.id, Arc::new(hook));
    }

    pub fn holds_focus(&self) -> bool {
        self.arbiter.owner() == Some(self.id)
    }
}

impl AudioFocus for FocusClient {
    fn request(&self) -> bool {
        let displaced = {
            let mut state = self.arbiter.state.lock();
            match state.owner {
                Some(owner) if owner == self.id => return true,
                previous => {
                    state.owner = Some(self.id);
                    previous.and_then(|id| state.hooks.get(&id).cloned())
                }
            }
        };

        debug!(client = self.id, "Audio focus granted");
        // Hooks run outside the lock so they may call back into the arbiter.
        if let Some(hook) = displaced {
            info!(client = self.id, "Audio focus taken from previous holder");
            hook();
        }
        true
    }

    fn abandon(&self) {
        let mut state = self.arbiter.state.lock();
        if state.owner == Some(self.id) {
            state.owner = None;
            debug!(client = self.id, "Audio focus abandoned");
        }
    }
}

impl Drop for FocusClient {
    fn drop(&mut self) {
        let mut state = self.arbiter.state.lock();
        state.hooks.remove(&self.id);
        if state.owner == Some(self.id) {
            state.owner = None;
        }
    }
}

impl std::fmt::Debug for FocusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusClient").field("id", &self.id).finish()
    }
}
