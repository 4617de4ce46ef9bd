//! Tracing metrics for observability

/// Counters describing a session's buffers
///
/// Counters are kept per thread buffer and summed on demand, so recording
/// threads never share a counter cache line. All values are monotonically
/// increasing for the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingMetrics {
    /// Number of threads that registered a buffer
    pub threads_registered: u64,

    /// Total number of events appended, including chunk growth markers
    pub events_recorded: u64,

    /// Total number of chunks allocated
    pub chunks_allocated: u64,
}

impl TracingMetrics {
    /// Create new metrics with zero values
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one thread buffer's counters in
    #[inline]
    pub fn record_thread(&mut self, events: u64, chunks: u64) {
        self.threads_registered = self.threads_registered.saturating_add(1);
        self.events_recorded = self.events_recorded.saturating_add(events);
        self.chunks_allocated = self.chunks_allocated.saturating_add(chunks);
    }

    /// Average number of events per registered thread
    pub fn events_per_thread(&self) -> u64 {
        self.events_recorded
            .checked_div(self.threads_registered)
            .unwrap_or(0)
    }

    /// Returns true if nothing was recorded and no buffer was created
    pub fn is_idle(&self) -> bool {
        self.threads_registered == 0 && self.events_recorded == 0
    }

    /// Merge metrics from another instance
    pub fn merge(&mut self, other: &TracingMetrics) {
        self.threads_registered = self
            .threads_registered
            .saturating_add(other.threads_registered);
        self.events_recorded = self.events_recorded.saturating_add(other.events_recorded);
        self.chunks_allocated = self
            .chunks_allocated
            .saturating_add(other.chunks_allocated);
    }
}

impl core::fmt::Display for TracingMetrics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "TracingMetrics(threads={}, events={}, chunks={})",
            self.threads_registered, self.events_recorded, self.chunks_allocated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_default() {
        let m = TracingMetrics::default();
        assert_eq!(m.events_recorded, 0);
        assert!(m.is_idle());
        assert_eq!(m.events_per_thread(), 0);
    }

    #[test]
    fn test_metrics_recording() {
        let mut m = TracingMetrics::new();
        m.record_thread(10, 1);
        m.record_thread(30, 2);

        assert_eq!(m.threads_registered, 2);
        assert_eq!(m.events_recorded, 40);
        assert_eq!(m.chunks_allocated, 3);
        assert_eq!(m.events_per_thread(), 20);
        assert!(!m.is_idle());
    }

    #[test]
    fn test_metrics_merge() {
        let mut m1 = TracingMetrics::new();
        m1.record_thread(100, 1);

        let m2 = TracingMetrics {
            threads_registered: 2,
            events_recorded: 50,
            ..Default::default()
        };

        m1.merge(&m2);

        assert_eq!(m1.threads_registered, 3);
        assert_eq!(m1.events_recorded, 150);
        assert_eq!(m1.chunks_allocated, 1);
    }

    #[test]
    fn test_metrics_saturating_add() {
        let mut m = TracingMetrics {
            events_recorded: u64::MAX,
            ..Default::default()
        };
        m.record_thread(1, 1);
        assert_eq!(m.events_recorded, u64::MAX);
    }

    #[test]
    fn test_metrics_display() {
        let mut m = TracingMetrics::new();
        m.record_thread(4, 1);
        assert_eq!(
            m.to_string(),
            "TracingMetrics(threads=1, events=4, chunks=1)"
        );
    }
}
