//! # Event Bus System
//!
//! Broadcasts player notifications to any number of async subscribers using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! Listener callbacks are synchronous and run on the player's control task.
//! Hosts that prefer a channel (UI layers, telemetry, tests) subscribe to an
//! [`EventBus`] instead; a bus-backed listener republishes every callback as a
//! [`PlayerEvent`] value.
//!
//! ```text
//! ┌──────────────┐  callback  ┌─────────────┐  emit  ┌──────────┐  subscribe  ┌────────────┐
//! │ MediaPlayer  ├───────────>│ BusListener ├───────>│ EventBus ├────────────>│ Subscriber │
//! └──────────────┘            └─────────────┘        └──────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventStream, PlayerEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut errors = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, PlayerEvent::Error { .. }));
//!
//! bus.emit(PlayerEvent::Loading).ok();
//! bus.emit(PlayerEvent::Error {
//!     code: 1,
//!     can_reload: true,
//!     message: "what = 1 (UNKNOWN), extra = -1004 (IO)".to_string(),
//! })
//! .ok();
//!
//! let event = errors.recv().await.unwrap();
//! assert!(matches!(event, PlayerEvent::Error { code: 1, .. }));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber was too slow and missed `n`
//!   events. Non-fatal.
//! - **`RecvError::Closed`**: every sender was dropped; the player is gone.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Value form of the player listener callbacks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    /// Loading began, either for a new source or after a slow seek.
    Loading,
    /// The engine did not prepare within the loading timeout.
    LoadFailed,
    /// The engine finished preparing.
    FinishLoading,
    /// The engine reported an error or failed to start.
    Error {
        code: i32,
        can_reload: bool,
        message: String,
    },
    /// A new source was accepted.
    StartPlay,
    /// The media reached its end.
    PlayComplete,
    /// A seek is taking long enough to show a loading state.
    StartSeek,
    /// A seek settled.
    SeekComplete,
    Resumed,
    Paused,
    Stopped,
}

impl PlayerEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::Loading => "Loading media",
            PlayerEvent::LoadFailed => "Media failed to load in time",
            PlayerEvent::FinishLoading => "Media loaded",
            PlayerEvent::Error { .. } => "Playback error",
            PlayerEvent::StartPlay => "Playback requested",
            PlayerEvent::PlayComplete => "Playback completed",
            PlayerEvent::StartSeek => "Seeking",
            PlayerEvent::SeekComplete => "Seek completed",
            PlayerEvent::Resumed => "Playback resumed",
            PlayerEvent::Paused => "Playback paused",
            PlayerEvent::Stopped => "Playback stopped",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayerEvent::Error { .. } => EventSeverity::Error,
            PlayerEvent::LoadFailed => EventSeverity::Warning,
            PlayerEvent::StartPlay | PlayerEvent::PlayComplete | PlayerEvent::Stopped => {
                EventSeverity::Info
            }
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

/// Central broadcast channel for [`PlayerEvent`]s.
///
/// Cheap to clone; clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls more than `capacity` events behind receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: PlayerEvent) -> Result<usize, SendError<PlayerEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&PlayerEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with predicate filtering.
pub struct EventStream {
    receiver: Receiver<PlayerEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<PlayerEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PlayerEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &PlayerEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<PlayerEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<PlayerEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
