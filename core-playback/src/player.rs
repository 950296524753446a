//! # Player State Machine
//!
//! [`MediaPlayer`] turns caller intent, render-surface availability and engine
//! callbacks into one authoritative [`PlayerState`] and a deterministic
//! notification sequence.
//!
//! ## Execution model
//!
//! The player is a plain synchronous value. Whoever owns it (normally the
//! driver task in [`crate::driver`]) must feed it three kinds of input on a
//! single thread of control:
//!
//! - host calls (`play`, `pause`, `on_surface_created`, ...);
//! - engine callbacks, drained from the receiver returned by
//!   [`MediaPlayer::new`] and passed to [`MediaPlayer::handle_engine_event`];
//! - timer expiry, by calling [`MediaPlayer::fire_due_timers`] once
//!   [`MediaPlayer::next_deadline`] has passed on the injected [`Clock`].
//!
//! Because all three arrive serially, no transition needs locking.

use crate::config::PlayerConfig;
use crate::engine::{
    codes, describe_error, EngineEvent, EngineEventSink, EngineFactory, MediaEngine, SessionEvent,
    SessionId,
};
use crate::error::{PlaybackError, Result};
use crate::layout::{calc_display_size, DisplaySize};
use crate::listener::{ListenerSet, PlayerListener};
use crate::request::PlaybackRequest;
use crate::state::PlayerState;
use crate::timer::{TimerKey, TimerQueue};
use bridge_traits::{AudioFocus, Clock, RenderSurface};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventSeverity, PlayerEvent};
use core_runtime::logging::redact_source;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, trace, warn};

/// Read-only copy of a player's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub session: u64,
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_loading: bool,
    pub is_loading_failed: bool,
    pub has_media: bool,
    pub duration_ms: u64,
    pub position_ms: u64,
    pub buffer_percent: i32,
    pub auto_resume: bool,
}

/// Per-session flags, reset by every `play`.
#[derive(Debug, Default, Clone, Copy)]
struct SessionFlags {
    paused: bool,
    loading: bool,
    load_failed: bool,
    prepared: bool,
    video_size_known: bool,
    auto_play_when_surface_ready: bool,
    resume_seek_pending: bool,
}

/// The player lifecycle core.
pub struct MediaPlayer<F: EngineFactory> {
    factory: F,
    config: PlayerConfig,
    surface: Arc<dyn RenderSurface>,
    audio_focus: Option<Arc<dyn AudioFocus>>,
    clock: Arc<dyn Clock>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,

    listeners: ListenerSet,
    timers: TimerQueue,
    engine: Option<F::Engine>,
    session: SessionId,
    request: Option<PlaybackRequest>,
    state: PlayerState,
    flags: SessionFlags,

    focus_held: bool,
    auto_resume: bool,
    video_size: (u32, u32),
    container_size: (u32, u32),
    buffer_percent: i32,
}

impl<F: EngineFactory> MediaPlayer<F> {
    /// Create an idle player.
    ///
    /// The returned receiver carries every engine callback. Its owner must
    /// pass each item to [`handle_engine_event`](Self::handle_engine_event).
    pub fn new(
        factory: F,
        config: PlayerConfig,
        surface: Arc<dyn RenderSurface>,
        clock: Arc<dyn Clock>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let auto_resume = config.auto_resume;
        let player = Self {
            factory,
            config,
            surface,
            audio_focus: None,
            clock,
            events_tx,
            listeners: ListenerSet::new(),
            timers: TimerQueue::new(),
            engine: None,
            session: SessionId::new(0),
            request: None,
            state: PlayerState::Idle,
            flags: SessionFlags::default(),
            focus_held: false,
            auto_resume,
            video_size: (0, 0),
            container_size: (0, 0),
            buffer_percent: 0,
        };
        (player, events_rx)
    }

    /// Create a player from the host capabilities in a [`CoreConfig`].
    pub fn from_core_config(
        factory: F,
        config: PlayerConfig,
        core: &CoreConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (player, rx) = Self::new(
            factory,
            config,
            Arc::clone(&core.render_surface),
            Arc::clone(&core.clock),
        );
        let player = match &core.audio_focus {
            Some(focus) => player.with_audio_focus(Arc::clone(focus)),
            None => player,
        };
        (player, rx)
    }

    /// Manage audio focus through `focus`.
    pub fn with_audio_focus(mut self, focus: Arc<dyn AudioFocus>) -> Self {
        self.audio_focus = Some(focus);
        self
    }

    pub fn add_listener(&mut self, listener: Arc<dyn PlayerListener>) {
        self.listeners.add(listener);
    }

    // ========================================================================
    // Host operations
    // ========================================================================

    /// Start playing `request`, replacing any current session.
    ///
    /// Invalid requests are rejected without touching the current session.
    /// Engine failures are reported to listeners, not returned.
    #[instrument(skip_all, fields(source = %redact_source(&request.source), resume_ms = request.resume_position_ms))]
    pub fn play(&mut self, request: PlaybackRequest) -> Result<()> {
        if self.is_destroyed() {
            warn!("play() on a destroyed player");
            return Err(PlaybackError::Destroyed);
        }
        if let Err(err) = request.validate() {
            warn!(error = %err, "Rejecting playback request");
            return Err(err);
        }

        self.teardown_session();

        self.session = self.session.next();
        self.flags = SessionFlags {
            loading: true,
            resume_seek_pending: request.resume_position_ms > 0,
            ..SessionFlags::default()
        };
        self.video_size = (0, 0);
        self.buffer_percent = 0;
        self.state = PlayerState::Loading;
        self.request = Some(request.clone());
        self.schedule(TimerKey::LoadingTimeout, self.config.loading_timeout());

        info!(session = %self.session, "Starting playback session");

        match self.start_engine(&request) {
            Ok(engine) => {
                self.engine = Some(engine);
                self.notify(PlayerEvent::StartPlay);
                self.notify(PlayerEvent::Loading);
            }
            Err(err) => {
                error!(session = %self.session, error = %err, "Engine failed to start");
                self.enter_error();
                self.notify(PlayerEvent::Error {
                    code: err.code(),
                    can_reload: err.can_reload(&self.config.non_retryable_codes),
                    message: err.to_string(),
                });
            }
        }
        Ok(())
    }

    fn start_engine(&mut self, request: &PlaybackRequest) -> Result<F::Engine> {
        let sink = EngineEventSink::new(self.session, self.events_tx.clone());
        let mut engine = self
            .factory
            .create(sink)
            .map_err(|e| PlaybackError::EngineStartFailure(format!("create: {}", e)))?;

        engine.set_display(None);
        let prepared = engine
            .set_source(request)
            .map_err(|e| PlaybackError::EngineStartFailure(format!("set_source: {}", e)))
            .and_then(|()| {
                engine.prepare_async().map_err(|e| {
                    PlaybackError::EngineStartFailure(format!("prepare_async: {}", e))
                })
            });

        match prepared {
            Ok(()) => Ok(engine),
            Err(err) => {
                engine.release();
                Err(err)
            }
        }
    }

    /// Pause a prepared, playing engine. No-op otherwise.
    pub fn pause(&mut self) {
        if self.is_destroyed() || self.is_failed() || !self.flags.prepared {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if !engine.is_playing() {
            return;
        }

        if let Err(err) = engine.pause() {
            self.fail_control("pause", err);
            return;
        }
        self.flags.paused = true;
        self.state = PlayerState::Paused;
        self.notify(PlayerEvent::Paused);
    }

    /// Resume a prepared engine when the surface can render. No-op otherwise.
    pub fn resume(&mut self) {
        if self.is_destroyed()
            || self.is_failed()
            || !self.flags.prepared
            || !self.surface.is_usable()
        {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        self.flags.paused = false;
        if let Err(err) = engine.start() {
            self.fail_control("start", err);
            return;
        }
        self.state = PlayerState::Playing;
        self.notify(PlayerEvent::Resumed);
    }

    /// Stop the engine. The player can be reused with `play`.
    ///
    /// Ignored in `Error`, which only a new `play` leaves.
    pub fn stop(&mut self) {
        if self.is_destroyed() || self.is_failed() {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        self.flags.paused = false;
        self.flags.prepared = false;
        self.flags.loading = false;
        self.flags.auto_play_when_surface_ready = false;
        self.timers.cancel_all();

        if let Err(err) = engine.stop() {
            self.fail_control("stop", err);
            return;
        }
        self.state = PlayerState::Stopped;
        self.notify(PlayerEvent::Stopped);
    }

    /// Seek to `position_ms`, clamping negative positions to zero.
    ///
    /// Clears the paused flag; the engine keeps its current play state.
    pub fn seek_to(&mut self, position_ms: i64) {
        if self.is_destroyed() || self.is_failed() {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let position = position_ms.max(0) as u64;
        debug!(position_ms = position, "Seeking");
        self.flags.paused = false;
        if let Err(err) = engine.seek_to(position) {
            self.fail_control("seek", err);
            return;
        }
        self.schedule(TimerKey::SeekStart, self.config.seek_start_delay());
    }

    /// Set output volume, clamped to `0.0..=1.0`.
    pub fn set_volume(&mut self, volume: f32) {
        if self.is_destroyed() || self.is_failed() {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        if let Err(err) = engine.set_volume(volume) {
            self.fail_control("set_volume", err);
        }
    }

    /// Resume automatically when the surface is recreated.
    pub fn set_auto_resume(&mut self, auto_resume: bool) {
        self.auto_resume = auto_resume;
    }

    /// Record the container size and push the fitted display size to the
    /// surface. Skipped when unchanged unless `force` is set.
    pub fn update_container_size(&mut self, width: u32, height: u32, force: bool) {
        if self.is_destroyed() {
            return;
        }
        if self.container_size == (width, height) && !force {
            return;
        }
        self.container_size = (width, height);
        self.push_display_size();
    }

    fn push_display_size(&self) {
        let (container_width, container_height) = self.container_size;
        let (video_width, video_height) = self.video_size;
        if let Some(DisplaySize { width, height }) =
            calc_display_size(container_width, container_height, video_width, video_height)
        {
            trace!(width, height, "Applying display size");
            self.surface.apply_display_size(width, height);
        }
    }

    /// Another participant took audio focus away.
    pub fn on_audio_focus_lost(&mut self) {
        if self.is_destroyed() {
            return;
        }
        info!("Audio focus lost");
        self.focus_held = false;
        self.pause();
    }

    /// Release everything. Idempotent; emits no notification.
    #[instrument(skip_all, fields(session = %self.session))]
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.teardown_session();
        self.abandon_focus();
        self.flags = SessionFlags::default();
        self.state = PlayerState::Destroyed;
        info!("Player destroyed");
    }

    /// Cancel timers and release the engine without notifying anyone.
    fn teardown_session(&mut self) {
        self.timers.cancel_all();
        if let Some(mut engine) = self.engine.take() {
            debug!(session = %self.session, "Releasing engine");
            if let Err(err) = engine.stop() {
                debug!(error = %err, "Engine stop during teardown failed");
            }
            engine.set_display(None);
            engine.release();
        }
    }

    // ========================================================================
    // Render surface callbacks
    // ========================================================================

    /// The render surface became usable.
    pub fn on_surface_created(&mut self) {
        if self.is_destroyed() {
            return;
        }
        if self.flags.auto_play_when_surface_ready {
            self.flags.auto_play_when_surface_ready = false;
            self.play_with_render();
            return;
        }

        if let Some(engine) = self.engine.as_mut() {
            engine.set_display(self.surface.display_handle());
        }
        if self.auto_resume {
            self.resume();
        }
    }

    /// The render surface went away.
    pub fn on_surface_destroyed(&mut self) {
        self.pause();
    }

    fn play_with_render(&mut self) {
        if self.is_failed() || !self.flags.prepared {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        engine.set_display(self.surface.display_handle());
        if let Err(err) = engine.start() {
            self.fail_control("start", err);
            return;
        }
        self.flags.paused = false;
        self.state = PlayerState::Playing;
        self.try_resume_seek();
    }

    fn try_resume_seek(&mut self) {
        if !(self.flags.resume_seek_pending && self.flags.prepared && self.flags.video_size_known) {
            return;
        }
        let Some(position) = self.request.as_ref().map(|r| r.resume_position_ms) else {
            return;
        };
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        self.flags.resume_seek_pending = false;
        debug!(position_ms = position, "Seeking to resume position");
        if let Err(err) = engine.seek_to(position) {
            self.fail_control("seek", err);
        }
    }

    // ========================================================================
    // Engine callbacks
    // ========================================================================

    /// Apply one engine callback. Events from any session other than the live
    /// one are dropped.
    pub fn handle_engine_event(&mut self, event: SessionEvent) {
        if self.is_destroyed() || self.engine.is_none() || event.session != self.session {
            debug!(
                event_session = %event.session,
                live_session = %self.session,
                event = ?event.event,
                "Dropping stale engine event"
            );
            return;
        }
        if self.is_failed() {
            debug!(event = ?event.event, "Dropping engine event after error");
            return;
        }

        match event.event {
            EngineEvent::Prepared => self.on_prepared(),
            EngineEvent::Error { what, extra } => self.on_engine_error(what, extra),
            EngineEvent::Completion => self.on_completion(),
            EngineEvent::SeekComplete => self.on_engine_seek_complete(),
            EngineEvent::BufferingUpdate(percent) => {
                self.buffer_percent = percent.clamp(0, 100);
            }
            EngineEvent::VideoSizeChanged { width, height } => {
                self.on_video_size_changed(width, height)
            }
        }
    }

    fn on_prepared(&mut self) {
        if self.flags.load_failed || self.state != PlayerState::Loading {
            debug!(state = ?self.state, "Ignoring prepared for a session that is no longer loading");
            return;
        }

        info!(session = %self.session, "Engine prepared");
        self.timers.cancel(TimerKey::LoadingTimeout);
        self.flags.prepared = true;
        self.flags.loading = false;
        self.flags.auto_play_when_surface_ready = false;

        if self.surface.is_being_created() || !self.surface.is_usable() {
            debug!("Render surface not ready, deferring start");
            self.flags.auto_play_when_surface_ready = true;
            self.state = PlayerState::Ready;
        } else {
            self.play_with_render();
        }

        self.notify(PlayerEvent::FinishLoading);
    }

    fn on_engine_error(&mut self, what: i32, extra: i32) {
        let message = describe_error(what, extra);
        let can_reload = PlaybackError::EngineRuntimeError {
            what,
            extra,
            message: message.clone(),
        }
        .can_reload(&self.config.non_retryable_codes);
        error!(session = %self.session, %message, can_reload, "Engine error");

        self.enter_error();
        self.notify(PlayerEvent::Error {
            code: what,
            can_reload,
            message,
        });
    }

    fn on_completion(&mut self) {
        info!(session = %self.session, "Playback completed");
        if let Some(engine) = self.engine.as_mut() {
            if let Err(err) = engine.seek_to(0) {
                warn!(error = %err, "Rewind after completion failed");
            }
        }
        self.flags.paused = false;
        self.state = PlayerState::Ready;
        self.notify(PlayerEvent::PlayComplete);
    }

    fn on_engine_seek_complete(&mut self) {
        self.timers.cancel(TimerKey::SeekStart);
        self.schedule(TimerKey::SeekSettle, self.config.seek_settle_delay());
    }

    fn on_video_size_changed(&mut self, width: u32, height: u32) {
        debug!(width, height, "Video size changed");
        self.video_size = (width, height);
        self.push_display_size();
        self.flags.video_size_known = true;
        self.try_resume_seek();
    }

    /// Report a failed control call as a retryable error.
    fn fail_control(&mut self, operation: &'static str, err: PlaybackError) {
        let err = err.into_control(operation);
        error!(session = %self.session, error = %err, "Engine control failed");

        self.enter_error();
        self.notify(PlayerEvent::Error {
            code: codes::PLAYER_ERROR,
            can_reload: err.can_reload(&self.config.non_retryable_codes),
            message: err.to_string(),
        });
    }

    /// Move to `Error`. The session keeps its engine for queries but accepts
    /// no transport calls until the next `play`.
    fn enter_error(&mut self) {
        self.timers.cancel_all();
        self.flags = SessionFlags {
            load_failed: true,
            video_size_known: self.flags.video_size_known,
            ..SessionFlags::default()
        };
        self.state = PlayerState::Error;
    }

    // ========================================================================
    // Timers
    // ========================================================================

    fn schedule(&mut self, key: TimerKey, delay: std::time::Duration) {
        self.timers.schedule(key, self.clock.now() + delay);
    }

    /// Earliest pending timer deadline, on the injected clock.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Fire every timer whose deadline has passed. Returns how many fired.
    pub fn fire_due_timers(&mut self) -> usize {
        let mut fired = 0;
        while let Some(key) = self.timers.pop_due(self.clock.now()) {
            fired += 1;
            self.on_timer(key);
        }
        fired
    }

    fn on_timer(&mut self, key: TimerKey) {
        if self.is_destroyed() {
            return;
        }
        trace!(timer = ?key, "Timer fired");
        match key {
            TimerKey::LoadingTimeout => {
                let err = PlaybackError::LoadTimeout(self.config.loading_timeout());
                warn!(session = %self.session, error = %err, "Giving up on loading");
                self.enter_error();
                self.notify(PlayerEvent::LoadFailed);
            }
            TimerKey::SeekStart => {
                self.flags.loading = true;
                self.notify(PlayerEvent::StartSeek);
            }
            TimerKey::SeekSettle => {
                self.timers.cancel(TimerKey::SeekStart);
                self.flags.loading = false;
                self.notify(PlayerEvent::SeekComplete);
            }
        }
    }

    // ========================================================================
    // Notifications and focus
    // ========================================================================

    fn notify(&mut self, event: PlayerEvent) {
        if self.is_destroyed() {
            return;
        }
        match &event {
            PlayerEvent::StartPlay | PlayerEvent::Resumed => self.request_focus(),
            PlayerEvent::LoadFailed
            | PlayerEvent::Error { .. }
            | PlayerEvent::PlayComplete
            | PlayerEvent::Paused
            | PlayerEvent::Stopped => self.abandon_focus(),
            _ => {}
        }
        if event.severity() >= EventSeverity::Info {
            info!(event = event.description(), session = %self.session, "Player notification");
        } else {
            debug!(event = event.description(), session = %self.session, "Player notification");
        }
        self.listeners.notify(&event);
    }

    fn request_focus(&mut self) {
        if self.focus_held {
            return;
        }
        if let Some(focus) = &self.audio_focus {
            self.focus_held = focus.request();
            if !self.focus_held {
                warn!("Audio focus request denied");
            }
        }
    }

    fn abandon_focus(&mut self) {
        if !self.focus_held {
            return;
        }
        if let Some(focus) = &self.audio_focus {
            focus.abandon();
        }
        self.focus_held = false;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    fn is_destroyed(&self) -> bool {
        self.state.is_terminal()
    }

    fn is_failed(&self) -> bool {
        self.state == PlayerState::Error
    }

    pub fn duration_ms(&self) -> u64 {
        self.engine.as_ref().map_or(0, |e| e.duration_ms())
    }

    pub fn current_position_ms(&self) -> u64 {
        self.engine.as_ref().map_or(0, |e| e.current_position_ms())
    }

    pub fn is_playing(&self) -> bool {
        self.engine.as_ref().map_or(false, |e| e.is_playing())
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused
    }

    pub fn is_loading(&self) -> bool {
        self.flags.loading
    }

    pub fn is_loading_failed(&self) -> bool {
        self.flags.load_failed
    }

    pub fn is_loading_or_playing(&self) -> bool {
        self.is_loading() || self.is_playing()
    }

    /// Whether an engine session exists.
    pub fn has_media(&self) -> bool {
        self.engine.is_some()
    }

    pub fn buffer_percent(&self) -> i32 {
        self.buffer_percent
    }

    pub fn auto_resume(&self) -> bool {
        self.auto_resume
    }

    pub fn holds_audio_focus(&self) -> bool {
        self.focus_held
    }

    /// Always `false`: completion returns the player to `Ready` and is only
    /// observable through `on_play_complete`.
    pub fn is_play_completed(&self) -> bool {
        false
    }

    pub fn request(&self) -> Option<&PlaybackRequest> {
        self.request.as_ref()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            session: self.session.raw(),
            is_playing: self.is_playing(),
            is_paused: self.is_paused(),
            is_loading: self.is_loading(),
            is_loading_failed: self.is_loading_failed(),
            has_media: self.has_media(),
            duration_ms: self.duration_ms(),
            position_ms: self.current_position_ms(),
            buffer_percent: self.buffer_percent,
            auto_resume: self.auto_resume,
        }
    }
}

impl<F: EngineFactory> std::fmt::Debug for MediaPlayer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPlayer")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("flags", &self.flags)
            .field("listeners", &self.listeners)
            .field("timers", &self.timers)
            .finish()
    }
}

impl<F: EngineFactory> Drop for MediaPlayer<F> {
    fn drop(&mut self) {
        self.destroy();
    }
}
