//! Injectable monotonic time.
//!
//! The player computes every timer deadline (loading timeout, seek delays)
//! from [`Clock::now`], so swapping the clock makes timer behavior fully
//! deterministic in tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::platform::PlatformSendSync;

/// Time source for timer deadlines.
///
/// ```ignore
/// use bridge_traits::time::Clock;
/// use std::time::Duration;
///
/// fn loading_deadline(clock: &dyn Clock) -> std::time::Instant {
///     clock.now() + Duration::from_secs(30)
/// }
/// ```
pub trait Clock: PlatformSendSync {
    fn now(&self) -> Instant;
}

/// Process monotonic clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves through [`ManualClock::advance`].
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }

    /// Total time advanced since creation.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        assert!(clock.now() >= a);
    }

    #[test]
    fn test_manual_clock_only_moves_on_advance() {
        let clock = ManualClock::new();
        let start = clock.now();
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_millis(300));
        assert_eq!(clock.now() - start, Duration::from_millis(300));

        clock.advance(Duration::from_millis(100));
        assert_eq!(clock.elapsed(), Duration::from_millis(400));
    }
}
