use bridge_traits::time::Clock;
use std::time::Instant;

/// Clock backed by `tokio::time::Instant`.
///
/// Under `tokio::time::pause()` this clock stands still and auto-advances with
/// the runtime, which keeps player deadlines consistent with the driver's
/// `sleep_until`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
