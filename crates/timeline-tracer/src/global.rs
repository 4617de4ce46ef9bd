//! Process-wide tracing facade
//!
//! Thin layer over one shared [`TraceSession`] for code that cannot have a
//! session passed to it. The disabled check is a single `Acquire` load; once
//! enabled, a thread that already has a buffer for the active session finds it
//! in thread-local storage without touching any lock.
//!
//! Enabling while a session is active, or disabling when none is, returns a
//! misuse error ([`TracingError::is_misuse`]) and leaves the active session,
//! if any, untouched.

use crate::{
    TraceConfig, TraceSession, TraceSink, Tracer, TracingError, TracingMetrics,
    buffer::ThreadBuffer, registry::cached_buffer, sink::create_default_sink,
};
use parking_lot::{Mutex, const_mutex};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(false);
static ACTIVE_ID: AtomicU64 = AtomicU64::new(0);
static ACTIVE: Mutex<Option<Arc<TraceSession>>> = const_mutex(None);

/// Enable process-wide tracing with the default configuration
///
/// # Errors
///
/// Returns [`TracingError::AlreadyEnabled`] if a session is active.
pub fn enable() -> Result<(), TracingError> {
    enable_with_config(TraceConfig::default())
}

/// Enable process-wide tracing writing to the configured output file
///
/// # Errors
///
/// Returns [`TracingError::AlreadyEnabled`] if a session is active, or a
/// configuration error.
pub fn enable_with_config(config: TraceConfig) -> Result<(), TracingError> {
    let sink = create_default_sink(&config);
    enable_with_sink(config, sink)
}

/// Enable process-wide tracing with a custom sink
///
/// # Errors
///
/// Returns [`TracingError::AlreadyEnabled`] if a session is active, or a
/// configuration error.
pub fn enable_with_sink(config: TraceConfig, sink: Box<dyn TraceSink>) -> Result<(), TracingError> {
    let mut active = ACTIVE.lock();
    if let Some(session) = active.as_ref() {
        tracing::error!(
            session = session.id(),
            "Tracing enable requested while a session is active"
        );
        return Err(TracingError::AlreadyEnabled);
    }

    let session = Arc::new(TraceSession::with_sink(config, sink)?);
    ACTIVE_ID.store(session.id(), Ordering::Release);
    *active = Some(session);
    ENABLED.store(true, Ordering::Release);
    Ok(())
}

/// Disable process-wide tracing and export the session
///
/// The export completes before another session can be enabled.
///
/// # Errors
///
/// Returns [`TracingError::NotEnabled`] if no session is active, or the sink's
/// error if the export fails.
pub fn disable() -> Result<TracingMetrics, TracingError> {
    disable_session(None)
}

fn disable_session(expected: Option<u64>) -> Result<TracingMetrics, TracingError> {
    let mut active = ACTIVE.lock();
    let session = match active.take() {
        Some(session) if expected.is_none_or(|id| id == session.id()) => session,
        other => {
            *active = other;
            if expected.is_none() {
                tracing::error!("Tracing disable requested with no active session");
            }
            return Err(TracingError::NotEnabled);
        }
    };
    ENABLED.store(false, Ordering::Release);
    ACTIVE_ID.store(0, Ordering::Release);

    let result = session.finish();
    drop(active);
    result
}

/// Check whether process-wide tracing is enabled
#[inline]
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Acquire)
}

/// Record the start of an interval on the calling thread
#[inline]
pub fn record_begin(name: &str, args: &[(&str, &str)]) {
    if !is_enabled() {
        return;
    }
    if let Some(buffer) = current_buffer() {
        buffer.record_begin(name, args);
    }
}

/// Record the end of an interval on the calling thread
#[inline]
pub fn record_end(name: &str) {
    if !is_enabled() {
        return;
    }
    if let Some(buffer) = current_buffer() {
        buffer.record_end(name);
    }
}

/// Rename the calling thread in the exported document; no-op when disabled
pub fn set_thread_name(name: &str) {
    if !is_enabled() {
        return;
    }
    if let Some(buffer) = current_buffer() {
        buffer.set_tid(name);
    }
}

/// Counters of the active session, if any
pub fn metrics() -> Option<TracingMetrics> {
    ACTIVE.lock().as_ref().map(|session| session.metrics())
}

/// Enable process-wide tracing for the lifetime of the returned guard
///
/// # Errors
///
/// Same as [`enable_with_config`].
pub fn enable_scoped(config: TraceConfig) -> Result<GlobalSessionGuard, TracingError> {
    let sink = create_default_sink(&config);
    enable_scoped_with_sink(config, sink)
}

/// Scoped variant of [`enable_with_sink`]
///
/// # Errors
///
/// Same as [`enable_with_sink`].
pub fn enable_scoped_with_sink(
    config: TraceConfig,
    sink: Box<dyn TraceSink>,
) -> Result<GlobalSessionGuard, TracingError> {
    enable_with_sink(config, sink)?;
    Ok(GlobalSessionGuard {
        session_id: ACTIVE_ID.load(Ordering::Acquire),
        armed: true,
    })
}

fn current_buffer() -> Option<Arc<ThreadBuffer>> {
    if let Some(buffer) = cached_buffer(ACTIVE_ID.load(Ordering::Acquire)) {
        return Some(buffer);
    }
    let session = ACTIVE.lock().as_ref().map(Arc::clone)?;
    if !session.is_enabled() {
        return None;
    }
    session.registry().buffer_for_current_thread()
}

/// Handle to the process-wide session, usable wherever a [`Tracer`] is expected
///
/// ```rust
/// use timeline_tracer::{GlobalTracer, trace_scope};
///
/// fn parse() {
///     trace_scope!(GlobalTracer, "parse", "file" => "x.dat");
///     // ...
/// }
/// # parse();
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalTracer;

impl Tracer for GlobalTracer {
    #[inline]
    fn is_enabled(&self) -> bool {
        is_enabled()
    }

    #[inline]
    fn record_begin(&self, name: &str, args: &[(&str, &str)]) {
        record_begin(name, args);
    }

    #[inline]
    fn record_end(&self, name: &str) {
        record_end(name);
    }

    fn set_thread_name(&self, name: &str) {
        set_thread_name(name);
    }
}

/// Disables and exports the process-wide session when dropped
///
/// Covers the case where the owner exits without an explicit
/// [`disable`]. The guard only disables the session it enabled.
#[must_use = "dropping the guard immediately disables tracing"]
#[derive(Debug)]
pub struct GlobalSessionGuard {
    session_id: u64,
    armed: bool,
}

impl GlobalSessionGuard {
    /// Disable now and return the export result
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::NotEnabled`] if the session was already
    /// disabled elsewhere, or the sink's error.
    pub fn finish(mut self) -> Result<TracingMetrics, TracingError> {
        self.armed = false;
        self.disable_own_session()
    }

    fn disable_own_session(&self) -> Result<TracingMetrics, TracingError> {
        disable_session(Some(self.session_id))
    }
}

impl Drop for GlobalSessionGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.disable_own_session() {
            Ok(_) | Err(TracingError::NotEnabled) => {}
            Err(e) => tracing::error!(error = %e, "Implicit trace export failed"),
        }
    }
}
