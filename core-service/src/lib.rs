//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (render surface,
//! audio focus, clock, logger sink) into players. Desktop apps typically
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`) to
//! get a headless surface, a Tokio clock and an in-process audio focus
//! arbiter without writing any bridge code.
//!
//! ```ignore
//! use core_playback::{PlaybackRequest, PlayerConfig, SymphoniaEngineFactory};
//! use core_service::CoreService;
//!
//! let core = CoreService::desktop()?;
//! core.init_logging(Default::default())?;
//!
//! let player = core.start_player(SymphoniaEngineFactory::new(), PlayerConfig::default())?;
//! player.play(PlaybackRequest::new("/music/track.flac")).await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_playback::driver::{self, PlayerHandle};
use core_playback::{EngineFactory, MediaPlayer, PlayerConfig};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use core_runtime::logging::{self, LoggingConfig};
use tracing::{debug, info};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
use bridge_desktop::{SharedAudioFocus, TokioClock};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
}

impl CoreService {
    /// Create a new service from the provided capabilities.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// A service backed by the desktop shims: headless surface, Tokio clock,
    /// no audio focus.
    #[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
    pub fn desktop() -> Result<Self> {
        let config = CoreConfig::builder().clock(Arc::new(TokioClock)).build()?;
        Self::new(config)
    }

    /// Access the capabilities being used by the service.
    pub fn config(&self) -> Arc<CoreConfig> {
        Arc::clone(&self.config)
    }

    /// Install the global tracing subscriber, mirroring events into the
    /// configured `LoggerSink` if there is one.
    pub fn init_logging(&self, logging: LoggingConfig) -> Result<()> {
        let logging = match &self.config.logger_sink {
            Some(sink) => logging.with_logger_sink(Arc::clone(sink)),
            None => logging,
        };
        logging::init_logging(logging)?;
        Ok(())
    }

    /// Spawn a player task using the service's capabilities.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_player<F: EngineFactory>(
        &self,
        factory: F,
        player_config: PlayerConfig,
    ) -> Result<PlayerHandle> {
        ensure_runtime()?;
        player_config.validate()?;

        let (player, engine_events) =
            MediaPlayer::from_core_config(factory, player_config, &self.config);
        Ok(self.spawn(player, engine_events))
    }

    /// Like [`start_player`](Self::start_player), with the player taking part
    /// in `focus`. When another participant takes focus, this player pauses.
    #[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
    pub fn start_player_with_focus<F: EngineFactory>(
        &self,
        factory: F,
        player_config: PlayerConfig,
        focus: &SharedAudioFocus,
    ) -> Result<PlayerHandle> {
        ensure_runtime()?;
        player_config.validate()?;

        let client = Arc::new(focus.client());
        let client_id = client.id();
        let (player, engine_events) =
            MediaPlayer::from_core_config(factory, player_config, &self.config);
        let player = player.with_audio_focus(client.clone());
        let handle = self.spawn(player, engine_events);

        let weak = handle.downgrade();
        client.on_loss(move || {
            if let Some(handle) = weak.upgrade() {
                debug!(client = client_id, "Forwarding audio focus loss");
                let _ = handle.audio_focus_lost();
            }
        });
        Ok(handle)
    }

    fn spawn<F: EngineFactory>(
        &self,
        player: MediaPlayer<F>,
        engine_events: tokio::sync::mpsc::UnboundedReceiver<core_playback::SessionEvent>,
    ) -> PlayerHandle {
        let bus = EventBus::new(self.config.event_buffer_size);
        let (handle, _task) = driver::spawn_with_bus(player, engine_events, bus);
        info!("Player started");
        handle
    }
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("config", &self.config)
            .finish()
    }
}

fn ensure_runtime() -> Result<()> {
    tokio::runtime::Handle::try_current()
        .map(|_| ())
        .map_err(|e| CoreError::InitializationFailed(format!("players need a Tokio runtime: {}", e)))
}
