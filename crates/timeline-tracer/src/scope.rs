//! Recording trait and scoped intervals

use std::sync::Arc;

/// Anything begin/end events can be recorded into
///
/// Implemented by [`TraceSession`](crate::TraceSession) and by
/// [`GlobalTracer`](crate::GlobalTracer), the handle for the process-wide
/// session. Recording methods never fail; they are no-ops while disabled.
pub trait Tracer {
    /// Check whether events are currently being recorded
    fn is_enabled(&self) -> bool;

    /// Record the start of an interval on the calling thread
    fn record_begin(&self, name: &str, args: &[(&str, &str)]);

    /// Record the end of an interval on the calling thread
    fn record_end(&self, name: &str);

    /// Rename the calling thread in the exported document
    fn set_thread_name(&self, name: &str);
}

impl<T: Tracer + ?Sized> Tracer for &T {
    #[inline]
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    #[inline]
    fn record_begin(&self, name: &str, args: &[(&str, &str)]) {
        (**self).record_begin(name, args);
    }

    #[inline]
    fn record_end(&self, name: &str) {
        (**self).record_end(name);
    }

    fn set_thread_name(&self, name: &str) {
        (**self).set_thread_name(name);
    }
}

impl<T: Tracer + ?Sized> Tracer for Arc<T> {
    #[inline]
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    #[inline]
    fn record_begin(&self, name: &str, args: &[(&str, &str)]) {
        (**self).record_begin(name, args);
    }

    #[inline]
    fn record_end(&self, name: &str) {
        (**self).record_end(name);
    }

    fn set_thread_name(&self, name: &str) {
        (**self).set_thread_name(name);
    }
}

/// Begin/end pair tied to a lexical scope
///
/// The begin event is recorded on construction and the matching end event on
/// drop, on every exit path including early returns and unwinding. A scope
/// opened while tracing was disabled stays silent at drop, so ends are never
/// emitted without their begin.
#[must_use = "dropping the scope immediately ends the interval; bind it with `let _scope = ...`"]
pub struct TraceScope<'a, T: Tracer + ?Sized> {
    tracer: &'a T,
    name: Option<&'a str>,
}

impl<'a, T: Tracer + ?Sized> TraceScope<'a, T> {
    /// Record a begin event and return the guard that ends it
    pub fn begin(tracer: &'a T, name: &'a str, args: &[(&str, &str)]) -> Self {
        if !tracer.is_enabled() {
            return Self::inactive(tracer);
        }
        tracer.record_begin(name, args);
        Self {
            tracer,
            name: Some(name),
        }
    }

    /// A guard that records nothing
    pub fn inactive(tracer: &'a T) -> Self {
        Self { tracer, name: None }
    }

    /// Returns true if a begin event was recorded
    pub fn is_active(&self) -> bool {
        self.name.is_some()
    }
}

impl<T: Tracer + ?Sized> Drop for TraceScope<'_, T> {
    fn drop(&mut self) {
        if let Some(name) = self.name.take() {
            self.tracer.record_end(name);
        }
    }
}

impl<T: Tracer + ?Sized> core::fmt::Debug for TraceScope<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TraceScope")
            .field("name", &self.name)
            .finish()
    }
}
