//! Explicit trace sessions
//!
//! A [`TraceSession`] is one enable/disable interval. It owns the registry of
//! thread buffers and the sink the finished timeline is written to. Sessions
//! are ordinary values: several can be alive in one process (each thread keeps
//! a separate buffer per session), which is what the process-wide facade in
//! [`crate::global`] is built on.

use crate::{
    TraceClock, TraceConfig, TraceEvent, TraceRegistry, TraceSink, Tracer, TracingError,
    TracingMetrics, sink::create_default_sink,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// One enabled tracing interval
///
/// Created enabled. [`disable`](TraceSession::disable) drains every thread's
/// buffer and hands the timeline to the sink. If the session is dropped while
/// still enabled the same export runs from `Drop`, so a session is exported
/// exactly once.
///
/// # Example
///
/// ```rust,no_run
/// use timeline_tracer::{TraceConfig, TraceSession};
///
/// let session = TraceSession::enable(TraceConfig::default().with_output_path("run.json"))?;
///
/// session.record_begin("load", &[("file", "x.dat")]);
/// session.record_end("load");
///
/// let metrics = session.disable()?;
/// assert_eq!(metrics.events_recorded, 2);
/// # Ok::<(), timeline_tracer::TracingError>(())
/// ```
///
/// # Thread Safety
///
/// The session is `Send + Sync`; share it by reference or `Arc`. Recording
/// from any thread only touches that thread's own buffer after its first event.
pub struct TraceSession {
    config: TraceConfig,
    registry: TraceRegistry,
    enabled: AtomicBool,
    sink: Mutex<Box<dyn TraceSink>>,
}

impl TraceSession {
    /// Enable a session that writes to the configured output file on export
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn enable(config: TraceConfig) -> Result<Self, TracingError> {
        let sink = create_default_sink(&config);
        Self::with_sink(config, sink)
    }

    /// Enable a session with a custom sink
    ///
    /// Use this for testing or alternative output destinations.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_sink(config: TraceConfig, sink: Box<dyn TraceSink>) -> Result<Self, TracingError> {
        config.validate()?;
        let registry = TraceRegistry::new(&config, TraceClock::start());
        tracing::info!(
            session = registry.id(),
            event_size = core::mem::size_of::<TraceEvent>(),
            chunk_capacity = config.chunk_capacity,
            output = %config.output_path.display(),
            "Enabling tracing"
        );
        Ok(Self {
            config,
            registry,
            enabled: AtomicBool::new(true),
            sink: Mutex::new(sink),
        })
    }

    /// Process-unique session id
    #[inline]
    pub fn id(&self) -> u64 {
        self.registry.id()
    }

    /// Configuration the session was enabled with
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Instant all timestamps are measured from
    pub fn epoch(&self) -> Instant {
        self.registry.clock().epoch()
    }

    /// Check whether the session is still recording
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Record the start of an interval on the calling thread
    ///
    /// A single atomic load when the session is disabled.
    #[inline]
    pub fn record_begin(&self, name: &str, args: &[(&str, &str)]) {
        if !self.is_enabled() {
            return;
        }
        if let Some(buffer) = self.registry.buffer_for_current_thread() {
            buffer.record_begin(name, args);
        }
    }

    /// Record the end of an interval on the calling thread
    #[inline]
    pub fn record_end(&self, name: &str) {
        if !self.is_enabled() {
            return;
        }
        if let Some(buffer) = self.registry.buffer_for_current_thread() {
            buffer.record_end(name);
        }
    }

    /// Rename the calling thread in the exported document
    ///
    /// Creates the thread's buffer if needed; no-op once disabled.
    pub fn set_thread_name(&self, name: &str) {
        if !self.is_enabled() {
            return;
        }
        if let Some(buffer) = self.registry.buffer_for_current_thread() {
            buffer.set_tid(name);
        }
    }

    /// Current counters
    pub fn metrics(&self) -> TracingMetrics {
        self.registry.metrics()
    }

    /// Stop recording and export the timeline
    ///
    /// Returns the final counters on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails. The recorded events are consumed
    /// either way.
    pub fn disable(self) -> Result<TracingMetrics, TracingError> {
        self.finish()
    }

    pub(crate) fn registry(&self) -> &TraceRegistry {
        &self.registry
    }

    /// Flip to disabled and export; only the first caller gets to export
    pub(crate) fn finish(&self) -> Result<TracingMetrics, TracingError> {
        if self
            .enabled
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::error!(session = self.id(), "Trace session already disabled");
            return Err(TracingError::NotEnabled);
        }

        let metrics = self.registry.metrics();
        let snapshot = self.registry.drain();
        tracing::info!(
            session = self.id(),
            events = snapshot.event_count(),
            threads = snapshot.threads().len(),
            chunks = snapshot.chunk_count(),
            "Exporting trace"
        );
        self.sink.lock().export(&snapshot)?;
        Ok(metrics)
    }
}

impl Tracer for TraceSession {
    #[inline]
    fn is_enabled(&self) -> bool {
        TraceSession::is_enabled(self)
    }

    #[inline]
    fn record_begin(&self, name: &str, args: &[(&str, &str)]) {
        TraceSession::record_begin(self, name, args);
    }

    #[inline]
    fn record_end(&self, name: &str) {
        TraceSession::record_end(self, name);
    }

    fn set_thread_name(&self, name: &str) {
        TraceSession::set_thread_name(self, name);
    }
}

impl Drop for TraceSession {
    fn drop(&mut self) {
        if !self.is_enabled() {
            return;
        }
        if let Err(e) = self.finish() {
            tracing::error!(session = self.id(), error = %e, "Implicit trace export failed");
        }
    }
}

impl core::fmt::Debug for TraceSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TraceSession")
            .field("id", &self.id())
            .field("enabled", &self.is_enabled())
            .field("threads", &self.registry.thread_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraceSnapshot;
    use std::sync::Arc;

    #[derive(Default)]
    struct MockSink {
        exports: Arc<Mutex<Vec<TraceSnapshot>>>,
    }

    impl TraceSink for MockSink {
        fn export(&mut self, snapshot: &TraceSnapshot) -> Result<(), TracingError> {
            self.exports.lock().push(snapshot.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl TraceSink for FailingSink {
        fn export(&mut self, _snapshot: &TraceSnapshot) -> Result<(), TracingError> {
            Err(TracingError::io(
                "unwritable.json",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ))
        }
    }

    fn session() -> (TraceSession, Arc<Mutex<Vec<TraceSnapshot>>>) {
        let sink = MockSink::default();
        let exports = Arc::clone(&sink.exports);
        let config = TraceConfig::default().with_chunk_capacity(16);
        let session = TraceSession::with_sink(config, Box::new(sink)).expect("valid config");
        (session, exports)
    }

    #[test]
    fn test_session_lifecycle() -> Result<(), TracingError> {
        let (session, exports) = session();
        assert!(session.is_enabled());

        session.record_begin("load", &[]);
        session.record_end("load");

        let metrics = session.disable()?;
        assert_eq!(metrics.events_recorded, 2);
        assert_eq!(metrics.threads_registered, 1);

        let exports = exports.lock();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].event_count(), 2);
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TraceConfig::default().with_chunk_capacity(0);
        let result = TraceSession::with_sink(config, Box::new(MockSink::default()));
        assert!(matches!(result, Err(TracingError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_drop_exports_once() {
        let (session, exports) = session();
        session.record_end("tail");
        drop(session);
        assert_eq!(exports.lock().len(), 1);
    }

    #[test]
    fn test_finish_twice_is_misuse() -> Result<(), TracingError> {
        let (session, exports) = session();
        session.record_end("x");
        session.finish()?;

        let second = session.finish();
        assert!(matches!(second, Err(TracingError::NotEnabled)));
        drop(session);
        assert_eq!(exports.lock().len(), 1);
        Ok(())
    }

    #[test]
    fn test_disabled_session_records_nothing() -> Result<(), TracingError> {
        let (session, exports) = session();
        session.finish()?;

        session.record_begin("late", &[]);
        session.set_thread_name("late-thread");
        assert!(session.metrics().is_idle());
        assert_eq!(exports.lock()[0].event_count(), 0);
        Ok(())
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let config = TraceConfig::default().with_chunk_capacity(4);
        let session = TraceSession::with_sink(config, Box::new(FailingSink)).expect("valid config");
        session.record_end("x");
        let result = session.disable();
        assert!(matches!(result, Err(TracingError::Io { .. })));
    }

    #[test]
    fn test_set_thread_name() -> Result<(), TracingError> {
        let (session, exports) = session();
        session.set_thread_name("renderer");
        session.record_end("frame");
        session.disable()?;

        let exports = exports.lock();
        assert!(exports[0].thread("renderer").is_some());
        Ok(())
    }
}
