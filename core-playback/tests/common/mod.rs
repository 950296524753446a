//! Scripted engine and harness shared by the player integration tests.

#![allow(dead_code)]

use bridge_desktop::HeadlessSurface;
use bridge_traits::focus::AudioFocus;
use bridge_traits::render::SurfaceHandle;
use bridge_traits::time::ManualClock;
use core_playback::engine::{EngineEvent, EngineEventSink, EngineFactory, MediaEngine, SessionEvent};
use core_playback::{MediaPlayer, PlaybackError, PlaybackRequest, PlayerConfig, PlayerListener};
use core_runtime::events::PlayerEvent;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything the scripted engines did, shared with the test.
#[derive(Debug, Default)]
pub struct EngineLog {
    pub calls: Vec<String>,
    pub sinks: Vec<EngineEventSink>,
    pub failing: HashSet<&'static str>,
    pub playing: bool,
    pub released: usize,
    pub display: Option<SurfaceHandle>,
    pub volume: Option<f32>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedFactory {
    pub log: Arc<Mutex<EngineLog>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` return an error from now on.
    pub fn fail(&self, operation: &'static str) {
        self.log.lock().failing.insert(operation);
    }

    /// Push `event` from the most recently created engine.
    pub fn emit(&self, event: EngineEvent) {
        let sink = self.log.lock().sinks.last().cloned().expect("no engine created");
        sink.emit(event);
    }

    /// Push `event` from the engine created `index`-th (0-based).
    pub fn emit_from(&self, index: usize, event: EngineEvent) {
        let sink = self.log.lock().sinks[index].clone();
        sink.emit(event);
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().calls.clear();
    }

    pub fn engines_created(&self) -> usize {
        self.log.lock().sinks.len()
    }

    pub fn released(&self) -> usize {
        self.log.lock().released
    }
}

impl EngineFactory for ScriptedFactory {
    type Engine = ScriptedEngine;

    fn create(&self, sink: EngineEventSink) -> core_playback::Result<ScriptedEngine> {
        let mut log = self.log.lock();
        if log.failing.contains("create") {
            return Err(PlaybackError::Decoder("decoder unavailable".into()));
        }
        log.calls.push("create".into());
        log.sinks.push(sink);
        log.playing = false;
        Ok(ScriptedEngine {
            log: Arc::clone(&self.log),
            released: false,
        })
    }
}

#[derive(Debug)]
pub struct ScriptedEngine {
    log: Arc<Mutex<EngineLog>>,
    released: bool,
}

impl ScriptedEngine {
    fn call(&self, name: &'static str) -> core_playback::Result<()> {
        if self.released {
            return Ok(());
        }
        let mut log = self.log.lock();
        log.calls.push(name.to_string());
        if log.failing.contains(name) {
            return Err(PlaybackError::Decoder(format!("{} rejected", name)));
        }
        Ok(())
    }
}

impl MediaEngine for ScriptedEngine {
    fn set_source(&mut self, request: &PlaybackRequest) -> core_playback::Result<()> {
        self.call("set_source")?;
        self.log
            .lock()
            .calls
            .push(format!("source={}", request.source));
        Ok(())
    }

    fn prepare_async(&mut self) -> core_playback::Result<()> {
        self.call("prepare_async")
    }

    fn start(&mut self) -> core_playback::Result<()> {
        self.call("start")?;
        self.log.lock().playing = true;
        Ok(())
    }

    fn pause(&mut self) -> core_playback::Result<()> {
        self.call("pause")?;
        self.log.lock().playing = false;
        Ok(())
    }

    fn stop(&mut self) -> core_playback::Result<()> {
        self.call("stop")?;
        self.log.lock().playing = false;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> core_playback::Result<()> {
        self.call("seek")?;
        self.log.lock().calls.push(format!("seek={}", position_ms));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> core_playback::Result<()> {
        self.call("set_volume")?;
        self.log.lock().volume = Some(volume);
        Ok(())
    }

    fn set_display(&mut self, handle: Option<SurfaceHandle>) {
        if !self.released {
            self.log.lock().display = handle;
        }
    }

    fn is_playing(&self) -> bool {
        !self.released && self.log.lock().playing
    }

    fn duration_ms(&self) -> u64 {
        self.log.lock().duration_ms
    }

    fn current_position_ms(&self) -> u64 {
        0
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut log = self.log.lock();
        log.calls.push("release".into());
        log.released += 1;
        log.playing = false;
    }
}

/// Listener that records every notification.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<PlayerEvent>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<PlayerEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl PlayerListener for EventLog {
    fn on_event(&self, event: &PlayerEvent) {
        self.events.lock().push(event.clone());
    }
}

/// A player wired to a scripted engine, a manual clock and a headless surface.
pub struct Harness {
    pub player: MediaPlayer<ScriptedFactory>,
    pub engine_events: mpsc::UnboundedReceiver<SessionEvent>,
    pub factory: ScriptedFactory,
    pub surface: Arc<HeadlessSurface>,
    pub clock: Arc<ManualClock>,
    pub log: Arc<EventLog>,
}

impl Harness {
    /// Surface already usable.
    pub fn new() -> Self {
        Self::with_surface(HeadlessSurface::ready(SurfaceHandle::new(1)))
    }

    pub fn with_surface(surface: HeadlessSurface) -> Self {
        Self::with_config(surface, PlayerConfig::default())
    }

    pub fn with_config(surface: HeadlessSurface, config: PlayerConfig) -> Self {
        Self::build(surface, config, None)
    }

    /// Usable surface, default config, managed audio focus.
    pub fn with_focus(focus: Arc<dyn AudioFocus>) -> Self {
        Self::build(
            HeadlessSurface::ready(SurfaceHandle::new(1)),
            PlayerConfig::default(),
            Some(focus),
        )
    }

    fn build(
        surface: HeadlessSurface,
        config: PlayerConfig,
        focus: Option<Arc<dyn AudioFocus>>,
    ) -> Self {
        let factory = ScriptedFactory::new();
        let surface = Arc::new(surface);
        let clock = Arc::new(ManualClock::new());
        let log = Arc::new(EventLog::default());

        let (player, engine_events) =
            MediaPlayer::new(factory.clone(), config, surface.clone(), clock.clone());
        let mut player = match focus {
            Some(focus) => player.with_audio_focus(focus),
            None => player,
        };
        player.add_listener(log.clone());

        Self {
            player,
            engine_events,
            factory,
            surface,
            clock,
            log,
        }
    }

    /// Deliver every queued engine callback.
    pub fn pump(&mut self) {
        while let Ok(event) = self.engine_events.try_recv() {
            self.player.handle_engine_event(event);
        }
    }

    /// Emit from the live engine and deliver it.
    pub fn engine(&mut self, event: EngineEvent) {
        self.factory.emit(event);
        self.pump();
    }

    /// Move the clock forward and fire whatever became due.
    pub fn advance_ms(&mut self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
        self.player.fire_due_timers();
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        self.log.events()
    }

    /// Play `source` and let the engine prepare.
    pub fn play_prepared(&mut self, source: &str) {
        self.player
            .play(PlaybackRequest::new(source))
            .expect("valid request");
        self.engine(EngineEvent::Prepared);
    }
}
