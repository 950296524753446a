//! # Player Driver
//!
//! Runs a [`MediaPlayer`] on its own tokio task and exposes it through a
//! cloneable async [`PlayerHandle`].
//!
//! The task multiplexes three inputs with `tokio::select!`:
//!
//! - commands from handles, applied in the order they were sent;
//! - engine callbacks from the player's session channel;
//! - the earliest pending timer deadline.
//!
//! Every listener notification is also republished on an [`EventBus`], so
//! hosts can observe the player with [`PlayerHandle::subscribe`].
//!
//! When the last handle is dropped the task destroys the player and exits.
//!
//! ```ignore
//! let (player, engine_events) = MediaPlayer::new(factory, config, surface, clock);
//! let (handle, task) = driver::spawn(player, engine_events);
//!
//! let mut events = handle.subscribe();
//! handle.play(PlaybackRequest::new("/music/track.flac")).await?;
//! ```

use crate::engine::{EngineFactory, SessionEvent};
use crate::error::{PlaybackError, Result};
use crate::listener::{BusListener, PlayerListener};
use crate::player::{MediaPlayer, PlayerSnapshot};
use crate::request::PlaybackRequest;
use core_runtime::events::{EventBus, EventStream};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

enum PlayerCommand {
    Play {
        request: PlaybackRequest,
        reply: oneshot::Sender<Result<()>>,
    },
    Pause,
    Resume,
    Stop,
    SeekTo(i64),
    SetVolume(f32),
    SetAutoResume(bool),
    UpdateContainerSize {
        width: u32,
        height: u32,
        force: bool,
    },
    SurfaceCreated,
    SurfaceDestroyed,
    AudioFocusLost,
    AddListener(Arc<dyn PlayerListener>),
    Snapshot(oneshot::Sender<PlayerSnapshot>),
    Destroy(oneshot::Sender<()>),
}

impl std::fmt::Debug for PlayerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlayerCommand::Play { .. } => "Play",
            PlayerCommand::Pause => "Pause",
            PlayerCommand::Resume => "Resume",
            PlayerCommand::Stop => "Stop",
            PlayerCommand::SeekTo(_) => "SeekTo",
            PlayerCommand::SetVolume(_) => "SetVolume",
            PlayerCommand::SetAutoResume(_) => "SetAutoResume",
            PlayerCommand::UpdateContainerSize { .. } => "UpdateContainerSize",
            PlayerCommand::SurfaceCreated => "SurfaceCreated",
            PlayerCommand::SurfaceDestroyed => "SurfaceDestroyed",
            PlayerCommand::AudioFocusLost => "AudioFocusLost",
            PlayerCommand::AddListener(_) => "AddListener",
            PlayerCommand::Snapshot(_) => "Snapshot",
            PlayerCommand::Destroy(_) => "Destroy",
        };
        f.write_str(name)
    }
}

/// Async front end to a player task.
///
/// Cheap to clone. Fails with [`PlaybackError::PlayerClosed`] once the task
/// is gone.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<PlayerCommand>,
    bus: EventBus,
}

impl PlayerHandle {
    fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::PlayerClosed)
    }

    /// Start a new session. Resolves once the request was accepted or
    /// rejected; loading progress arrives as events.
    pub async fn play(&self, request: PlaybackRequest) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::Play { request, reply })?;
        rx.await.map_err(|_| PlaybackError::PlayerClosed)?
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(PlayerCommand::Pause)
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(PlayerCommand::Resume)
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(PlayerCommand::Stop)
    }

    pub async fn seek_to(&self, position_ms: i64) -> Result<()> {
        self.send(PlayerCommand::SeekTo(position_ms))
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.send(PlayerCommand::SetVolume(volume))
    }

    pub async fn set_auto_resume(&self, auto_resume: bool) -> Result<()> {
        self.send(PlayerCommand::SetAutoResume(auto_resume))
    }

    /// Report a new container size. See [`MediaPlayer::update_container_size`].
    pub async fn resize_container(&self, width: u32, height: u32, force: bool) -> Result<()> {
        self.send(PlayerCommand::UpdateContainerSize {
            width,
            height,
            force,
        })
    }

    /// Forward the host's surface-created callback.
    pub async fn surface_created(&self) -> Result<()> {
        self.send(PlayerCommand::SurfaceCreated)
    }

    /// Forward the host's surface-destroyed callback.
    pub async fn surface_destroyed(&self) -> Result<()> {
        self.send(PlayerCommand::SurfaceDestroyed)
    }

    /// Forward an audio focus loss. Synchronous so it can be called from a
    /// focus manager's hook.
    pub fn audio_focus_lost(&self) -> Result<()> {
        self.send(PlayerCommand::AudioFocusLost)
    }

    pub async fn add_listener(&self, listener: Arc<dyn PlayerListener>) -> Result<()> {
        self.send(PlayerCommand::AddListener(listener))
    }

    /// Observable state after every previously sent command was applied.
    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(reply))?;
        rx.await.map_err(|_| PlaybackError::PlayerClosed)
    }

    pub async fn duration_ms(&self) -> Result<u64> {
        Ok(self.snapshot().await?.duration_ms)
    }

    pub async fn current_position_ms(&self) -> Result<u64> {
        Ok(self.snapshot().await?.position_ms)
    }

    pub async fn is_playing(&self) -> Result<bool> {
        Ok(self.snapshot().await?.is_playing)
    }

    pub async fn is_paused(&self) -> Result<bool> {
        Ok(self.snapshot().await?.is_paused)
    }

    /// Destroy the player. The task keeps answering until every handle is
    /// dropped, but the player accepts no new sessions.
    pub async fn destroy(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::Destroy(reply))?;
        rx.await.map_err(|_| PlaybackError::PlayerClosed)
    }

    /// Stream of every notification from this point on.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.bus.subscribe())
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// A handle that does not keep the player task alive.
    pub fn downgrade(&self) -> WeakPlayerHandle {
        WeakPlayerHandle {
            commands: self.commands.downgrade(),
            bus: self.bus.clone(),
        }
    }
}

/// Non-owning [`PlayerHandle`], for callbacks registered with collaborators
/// the player itself keeps alive.
#[derive(Debug, Clone)]
pub struct WeakPlayerHandle {
    commands: mpsc::WeakUnboundedSender<PlayerCommand>,
    bus: EventBus,
}

impl WeakPlayerHandle {
    /// `None` once every strong handle is gone.
    pub fn upgrade(&self) -> Option<PlayerHandle> {
        self.commands.upgrade().map(|commands| PlayerHandle {
            commands,
            bus: self.bus.clone(),
        })
    }
}

/// Move `player` onto a new tokio task.
///
/// `engine_events` must be the receiver returned alongside the player by
/// [`MediaPlayer::new`].
pub fn spawn<F: EngineFactory>(
    player: MediaPlayer<F>,
    engine_events: mpsc::UnboundedReceiver<SessionEvent>,
) -> (PlayerHandle, JoinHandle<()>) {
    spawn_with_bus(player, engine_events, EventBus::default())
}

/// Like [`spawn`], publishing notifications on an existing bus.
pub fn spawn_with_bus<F: EngineFactory>(
    mut player: MediaPlayer<F>,
    engine_events: mpsc::UnboundedReceiver<SessionEvent>,
    bus: EventBus,
) -> (PlayerHandle, JoinHandle<()>) {
    let (commands, command_rx) = mpsc::unbounded_channel();
    player.add_listener(Arc::new(BusListener::new(bus.clone())));

    let task = tokio::spawn(run(player, command_rx, engine_events));
    (PlayerHandle { commands, bus }, task)
}

async fn run<F: EngineFactory>(
    mut player: MediaPlayer<F>,
    mut commands: mpsc::UnboundedReceiver<PlayerCommand>,
    mut engine_events: mpsc::UnboundedReceiver<SessionEvent>,
) {
    debug!("Player task started");
    loop {
        let deadline = player.next_deadline();
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(command) => apply(&mut player, command),
                None => break,
            },
            Some(event) = engine_events.recv() => {
                player.handle_engine_event(event);
            }
            _ = wait_until(deadline) => {
                player.fire_due_timers();
            }
        }
    }
    player.destroy();
    info!("Player task finished");
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

fn apply<F: EngineFactory>(player: &mut MediaPlayer<F>, command: PlayerCommand) {
    debug!(command = ?command, "Applying player command");
    match command {
        PlayerCommand::Play { request, reply } => {
            let _ = reply.send(player.play(request));
        }
        PlayerCommand::Pause => player.pause(),
        PlayerCommand::Resume => player.resume(),
        PlayerCommand::Stop => player.stop(),
        PlayerCommand::SeekTo(position_ms) => player.seek_to(position_ms),
        PlayerCommand::SetVolume(volume) => player.set_volume(volume),
        PlayerCommand::SetAutoResume(auto_resume) => player.set_auto_resume(auto_resume),
        PlayerCommand::UpdateContainerSize {
            width,
            height,
            force,
        } => player.update_container_size(width, height, force),
        PlayerCommand::SurfaceCreated => player.on_surface_created(),
        PlayerCommand::SurfaceDestroyed => player.on_surface_destroyed(),
        PlayerCommand::AudioFocusLost => player.on_audio_focus_lost(),
        PlayerCommand::AddListener(listener) => player.add_listener(listener),
        PlayerCommand::Snapshot(reply) => {
            let _ = reply.send(player.snapshot());
        }
        PlayerCommand::Destroy(reply) => {
            player.destroy();
            let _ = reply.send(());
        }
    }
}
