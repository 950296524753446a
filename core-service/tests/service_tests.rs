#![cfg(feature = "desktop-shims")]

use bridge_desktop::{HeadlessSurface, SharedAudioFocus, TokioClock};
use bridge_traits::render::SurfaceHandle;
use core_playback::engine::{EngineEvent, EngineEventSink, EngineFactory, MediaEngine};
use core_playback::{PlaybackError, PlaybackRequest, PlayerConfig, PlayerState};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventStream, PlayerEvent};
use core_service::{CoreError, CoreService};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Engine that prepares as soon as it is asked to.
#[derive(Debug, Clone, Default)]
struct InstantFactory;

struct InstantEngine {
    sink: EngineEventSink,
    playing: Arc<Mutex<bool>>,
}

impl EngineFactory for InstantFactory {
    type Engine = InstantEngine;

    fn create(&self, sink: EngineEventSink) -> core_playback::Result<InstantEngine> {
        Ok(InstantEngine {
            sink,
            playing: Arc::default(),
        })
    }
}

impl MediaEngine for InstantEngine {
    fn set_source(&mut self, _request: &PlaybackRequest) -> core_playback::Result<()> {
        Ok(())
    }

    fn prepare_async(&mut self) -> core_playback::Result<()> {
        self.sink.emit(EngineEvent::Prepared);
        Ok(())
    }

    fn start(&mut self) -> core_playback::Result<()> {
        *self.playing.lock() = true;
        Ok(())
    }

    fn pause(&mut self) -> core_playback::Result<()> {
        *self.playing.lock() = false;
        Ok(())
    }

    fn stop(&mut self) -> core_playback::Result<()> {
        *self.playing.lock() = false;
        Ok(())
    }

    fn seek_to(&mut self, _position_ms: u64) -> core_playback::Result<()> {
        self.sink.emit(EngineEvent::SeekComplete);
        Ok(())
    }

    fn set_volume(&mut self, _volume: f32) -> core_playback::Result<()> {
        Ok(())
    }

    fn set_display(&mut self, _handle: Option<SurfaceHandle>) {}

    fn is_playing(&self) -> bool {
        *self.playing.lock()
    }

    fn duration_ms(&self) -> u64 {
        0
    }

    fn current_position_ms(&self) -> u64 {
        0
    }

    fn release(&mut self) {
        *self.playing.lock() = false;
    }
}

fn service() -> CoreService {
    let config = CoreConfig::builder()
        .render_surface(Arc::new(HeadlessSurface::ready(SurfaceHandle::new(1))))
        .clock(Arc::new(TokioClock))
        .build()
        .unwrap();
    CoreService::new(config).unwrap()
}

async fn wait_for(events: &mut EventStream, expected: PlayerEvent) {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for player event")
            .expect("event stream closed");
        if event == expected {
            return;
        }
    }
}

#[tokio::test]
async fn test_start_player_plays() {
    let core = service();
    let player = core
        .start_player(InstantFactory, PlayerConfig::default())
        .unwrap();
    let mut events = player.subscribe();

    player.play(PlaybackRequest::new("a.mp4")).await.unwrap();
    wait_for(&mut events, PlayerEvent::FinishLoading).await;

    assert_eq!(player.snapshot().await.unwrap().state, PlayerState::Playing);
}

#[tokio::test]
async fn test_invalid_player_config_is_rejected() {
    let core = service();
    let config = PlayerConfig {
        loading_timeout_ms: 0,
        ..PlayerConfig::default()
    };

    let result = core.start_player(InstantFactory, config);

    assert!(matches!(
        result,
        Err(CoreError::Playback(PlaybackError::InvalidConfig(_)))
    ));
}

#[test]
fn test_start_player_requires_runtime() {
    let core = service();

    let result = core.start_player(InstantFactory, PlayerConfig::default());

    assert!(matches!(result, Err(CoreError::InitializationFailed(_))));
}

#[tokio::test]
async fn test_desktop_service_uses_headless_surface() {
    let core = CoreService::desktop().unwrap();
    let player = core
        .start_player(InstantFactory, PlayerConfig::default())
        .unwrap();
    let mut events = player.subscribe();

    player.play(PlaybackRequest::new("a.mp4")).await.unwrap();
    wait_for(&mut events, PlayerEvent::FinishLoading).await;

    // The headless surface does not exist yet, so the player waits for it.
    assert_eq!(player.snapshot().await.unwrap().state, PlayerState::Ready);
}

#[tokio::test]
async fn test_second_player_takes_focus_from_first() {
    let core = service();
    let focus = SharedAudioFocus::new();
    let first = core
        .start_player_with_focus(InstantFactory, PlayerConfig::default(), &focus)
        .unwrap();
    let second = core
        .start_player_with_focus(InstantFactory, PlayerConfig::default(), &focus)
        .unwrap();
    let mut first_events = first.subscribe();
    let mut second_events = second.subscribe();

    first.play(PlaybackRequest::new("a.mp4")).await.unwrap();
    wait_for(&mut first_events, PlayerEvent::FinishLoading).await;
    assert!(focus.owner().is_some());
    let first_owner = focus.owner();

    second.play(PlaybackRequest::new("b.mp4")).await.unwrap();
    wait_for(&mut second_events, PlayerEvent::FinishLoading).await;
    wait_for(&mut first_events, PlayerEvent::Paused).await;

    assert_eq!(first.snapshot().await.unwrap().state, PlayerState::Paused);
    assert_eq!(second.snapshot().await.unwrap().state, PlayerState::Playing);
    assert_ne!(focus.owner(), first_owner);
}

#[tokio::test]
async fn test_players_have_separate_event_streams() {
    let core = service();
    let first = core
        .start_player(InstantFactory, PlayerConfig::default())
        .unwrap();
    let second = core
        .start_player(InstantFactory, PlayerConfig::default())
        .unwrap();
    let mut second_events = second.subscribe();

    first.play(PlaybackRequest::new("a.mp4")).await.unwrap();
    first.snapshot().await.unwrap();

    assert!(second_events.try_recv().is_none());
}
