//! # Symphonia Engine
//!
//! Media engine for local audio files. Preparation probes the container and
//! codec with symphonia on the blocking pool; playback itself is a timeline
//! driven by the tokio clock, which is enough for hosts that render audio
//! elsewhere and for exercising the state machine against real media.

use super::{codes, EngineEvent, EngineEventSink, EngineFactory, MediaEngine};
use crate::error::{PlaybackError, Result};
use crate::request::PlaybackRequest;
use bridge_traits::render::SurfaceHandle;
use parking_lot::Mutex;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// What a successful probe learned about the media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaInfo {
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Creates [`SymphoniaEngine`]s on the current tokio runtime.
#[derive(Debug, Default, Clone)]
pub struct SymphoniaEngineFactory;

impl SymphoniaEngineFactory {
    pub fn new() -> Self {
        Self
    }
}

impl EngineFactory for SymphoniaEngineFactory {
    type Engine = SymphoniaEngine;

    fn create(&self, sink: EngineEventSink) -> Result<SymphoniaEngine> {
        let runtime = Handle::try_current().map_err(|e| {
            PlaybackError::EngineStartFailure(format!("no tokio runtime: {}", e))
        })?;
        Ok(SymphoniaEngine::new(sink, runtime))
    }
}

#[derive(Debug, Default)]
struct Timeline {
    preparing: bool,
    prepared: bool,
    /// A seek arrived while preparing; `base_ms` holds its target.
    seek_pending: bool,
    duration_ms: u64,
    base_ms: u64,
    started_at: Option<Instant>,
}

impl Timeline {
    fn position_ms(&self) -> u64 {
        let elapsed = self
            .started_at
            .map_or(0, |at| at.elapsed().as_millis() as u64);
        let position = self.base_ms + elapsed;
        if self.duration_ms > 0 {
            position.min(self.duration_ms)
        } else {
            position
        }
    }

    fn remaining(&self) -> Duration {
        Duration::from_millis(self.duration_ms.saturating_sub(self.position_ms()))
    }
}

/// A symphonia-probed media session.
pub struct SymphoniaEngine {
    sink: EngineEventSink,
    runtime: Handle,
    source: Option<String>,
    timeline: Arc<Mutex<Timeline>>,
    prepare_task: Option<JoinHandle<()>>,
    completion_task: Option<JoinHandle<()>>,
    display: Option<SurfaceHandle>,
    volume: f32,
    released: bool,
}

impl SymphoniaEngine {
    fn new(sink: EngineEventSink, runtime: Handle) -> Self {
        Self {
            sink,
            runtime,
            source: None,
            timeline: Arc::new(Mutex::new(Timeline::default())),
            prepare_task: None,
            completion_task: None,
            display: None,
            volume: 1.0,
            released: false,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn display(&self) -> Option<SurfaceHandle> {
        self.display
    }

    fn ensure_prepared(&self, operation: &'static str) -> Result<()> {
        if self.released {
            return Err(PlaybackError::EngineControl {
                operation,
                message: "engine released".to_string(),
            });
        }
        if !self.timeline.lock().prepared {
            return Err(PlaybackError::EngineControl {
                operation,
                message: "media not prepared".to_string(),
            });
        }
        Ok(())
    }

    fn cancel_completion(&mut self) {
        if let Some(task) = self.completion_task.take() {
            task.abort();
        }
    }

    /// Schedule the completion callback for the current timeline.
    fn arm_completion(&mut self) {
        self.cancel_completion();
        let remaining = {
            let timeline = self.timeline.lock();
            if timeline.started_at.is_none() || timeline.duration_ms == 0 {
                return;
            }
            timeline.remaining()
        };

        let timeline = Arc::clone(&self.timeline);
        let sink = self.sink.clone();
        self.completion_task = Some(self.runtime.spawn(async move {
            tokio::time::sleep(remaining).await;
            {
                let mut timeline = timeline.lock();
                timeline.base_ms = timeline.duration_ms;
                timeline.started_at = None;
            }
            debug!(session = %sink.session(), "Reached end of media");
            sink.emit(EngineEvent::Completion);
        }));
    }
}

impl MediaEngine for SymphoniaEngine {
    fn set_source(&mut self, request: &PlaybackRequest) -> Result<()> {
        if self.released {
            return Err(PlaybackError::EngineStartFailure("engine released".into()));
        }
        self.source = Some(request.source.clone());
        Ok(())
    }

    #[instrument(skip(self), fields(session = %self.sink.session()))]
    fn prepare_async(&mut self) -> Result<()> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| PlaybackError::EngineStartFailure("no source set".into()))?;

        self.timeline.lock().preparing = true;
        let timeline = Arc::clone(&self.timeline);
        let sink = self.sink.clone();
        let probe = self.runtime.spawn_blocking(move || probe_source(&source));
        self.prepare_task = Some(self.runtime.spawn(async move {
            let outcome = match probe.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "Probe task failed");
                    Err(codes::MEDIA_ERROR_IO)
                }
            };
            match outcome {
                Ok(info) => {
                    info!(
                        duration_ms = info.duration_ms,
                        sample_rate = info.sample_rate,
                        channels = info.channels,
                        "Media probed"
                    );
                    let seeked = {
                        let mut timeline = timeline.lock();
                        timeline.preparing = false;
                        timeline.prepared = true;
                        timeline.duration_ms = info.duration_ms;
                        if info.duration_ms > 0 {
                            timeline.base_ms = timeline.base_ms.min(info.duration_ms);
                        }
                        std::mem::take(&mut timeline.seek_pending)
                    };
                    sink.emit(EngineEvent::Prepared);
                    sink.emit(EngineEvent::VideoSizeChanged {
                        width: 0,
                        height: 0,
                    });
                    if seeked {
                        sink.emit(EngineEvent::SeekComplete);
                    }
                }
                Err(extra) => {
                    timeline.lock().preparing = false;
                    sink.emit(EngineEvent::Error {
                        what: codes::MEDIA_ERROR_UNKNOWN,
                        extra,
                    });
                }
            }
        }));
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.ensure_prepared("start")?;
        {
            let mut timeline = self.timeline.lock();
            if timeline.started_at.is_some() {
                return Ok(());
            }
            if timeline.duration_ms > 0 && timeline.base_ms >= timeline.duration_ms {
                timeline.base_ms = 0;
            }
            timeline.started_at = Some(Instant::now());
        }
        self.arm_completion();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.ensure_prepared("pause")?;
        self.cancel_completion();
        let mut timeline = self.timeline.lock();
        timeline.base_ms = timeline.position_ms();
        timeline.started_at = None;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.cancel_completion();
        let mut timeline = self.timeline.lock();
        timeline.preparing = false;
        timeline.prepared = false;
        timeline.seek_pending = false;
        timeline.base_ms = 0;
        timeline.started_at = None;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        {
            let mut timeline = self.timeline.lock();
            if !self.released && timeline.preparing {
                debug!(position_ms, "Holding seek until the media is prepared");
                timeline.base_ms = position_ms;
                timeline.seek_pending = true;
                return Ok(());
            }
        }
        self.ensure_prepared("seek")?;
        {
            let mut timeline = self.timeline.lock();
            timeline.base_ms = if timeline.duration_ms > 0 {
                position_ms.min(timeline.duration_ms)
            } else {
                position_ms
            };
            if timeline.started_at.is_some() {
                timeline.started_at = Some(Instant::now());
            }
        }
        self.arm_completion();
        self.sink.emit(EngineEvent::SeekComplete);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        if self.released {
            return Err(PlaybackError::EngineControl {
                operation: "set_volume",
                message: "engine released".to_string(),
            });
        }
        self.volume = volume;
        Ok(())
    }

    fn set_display(&mut self, handle: Option<SurfaceHandle>) {
        self.display = handle;
    }

    fn is_playing(&self) -> bool {
        !self.released && self.timeline.lock().started_at.is_some()
    }

    fn duration_ms(&self) -> u64 {
        self.timeline.lock().duration_ms
    }

    fn current_position_ms(&self) -> u64 {
        self.timeline.lock().position_ms()
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.cancel_completion();
        if let Some(task) = self.prepare_task.take() {
            task.abort();
        }
        *self.timeline.lock() = Timeline::default();
    }
}

impl Drop for SymphoniaEngine {
    fn drop(&mut self) {
        self.release();
    }
}

/// Resolve a request source to a local path. Only plain paths and `file://`
/// URIs are playable.
fn local_path(source: &str) -> Option<PathBuf> {
    if let Some(rest) = source.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if source.contains("://") {
        return None;
    }
    Some(PathBuf::from(source))
}

/// Probe `source`, returning the engine `extra` code on failure.
fn probe_source(source: &str) -> std::result::Result<MediaInfo, i32> {
    let path = local_path(source).ok_or_else(|| {
        debug!("Remote sources are not supported by this engine");
        codes::MEDIA_ERROR_UNSUPPORTED
    })?;
    probe_file(&path)
}

/// Probe a local media file.
pub fn probe_file(path: &Path) -> std::result::Result<MediaInfo, i32> {
    let file = File::open(path).map_err(|e| {
        warn!(error = %e, "Failed to open media file");
        codes::MEDIA_ERROR_IO
    })?;

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            warn!(error = %e, "Format probe failed");
            extra_code(&e)
        })?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(codes::MEDIA_ERROR_UNSUPPORTED)?;

    symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| {
            warn!(error = %e, "No decoder for track");
            extra_code(&e)
        })?;

    let params = &track.codec_params;
    let sample_rate = params.sample_rate.unwrap_or(0);
    let duration_ms = match params.n_frames {
        Some(frames) if sample_rate > 0 => frames * 1000 / u64::from(sample_rate),
        _ => 0,
    };

    Ok(MediaInfo {
        duration_ms,
        sample_rate,
        channels: params.channels.map_or(0, |c| c.count() as u16),
    })
}

fn extra_code(error: &SymphoniaError) -> i32 {
    match error {
        SymphoniaError::Unsupported(_) => codes::MEDIA_ERROR_UNSUPPORTED,
        SymphoniaError::IoError(_) => codes::MEDIA_ERROR_IO,
        _ => codes::MEDIA_ERROR_MALFORMED,
    }
}
