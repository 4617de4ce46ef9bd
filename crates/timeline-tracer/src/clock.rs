//! Session timestamp clock

use std::time::Instant;

/// Monotonic clock anchored at the instant a session was enabled
///
/// Every timestamp is an offset from the epoch in nanoseconds. The value is
/// full-width `u64`, which covers roughly 584 years before saturating.
#[derive(Debug, Clone, Copy)]
pub struct TraceClock {
    epoch: Instant,
}

impl TraceClock {
    /// Capture a new epoch
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// The instant the session began
    #[inline]
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Nanoseconds elapsed since the epoch
    #[inline]
    pub fn now_ns(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}
