//! Recording macros
//!
//! Every macro takes the tracer first: a [`TraceSession`](crate::TraceSession),
//! an `Arc` of one, or [`GlobalTracer`](crate::GlobalTracer). Argument values
//! are only evaluated while the tracer is enabled.

/// Record a begin event
///
/// # Example
///
/// ```rust
/// use timeline_tracer::{GlobalTracer, trace_begin, trace_end};
///
/// trace_begin!(GlobalTracer, "decode", "frame" => "12");
/// trace_end!(GlobalTracer, "decode");
/// ```
#[macro_export]
macro_rules! trace_begin {
    ($tracer:expr, $name:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let tracer = &$tracer;
        if $crate::Tracer::is_enabled(tracer) {
            $crate::Tracer::record_begin(tracer, $name, &[$(($key, $value)),*]);
        }
    }};
}

/// Record an end event
///
/// # Example
///
/// ```rust
/// use timeline_tracer::{GlobalTracer, trace_end};
///
/// trace_end!(GlobalTracer, "decode");
/// ```
#[macro_export]
macro_rules! trace_end {
    ($tracer:expr, $name:expr) => {{
        let tracer = &$tracer;
        if $crate::Tracer::is_enabled(tracer) {
            $crate::Tracer::record_end(tracer, $name);
        }
    }};
}

/// Record a begin event now and the matching end event when the enclosing
/// block exits
///
/// Expands to a hidden `let` binding, so the interval covers the rest of the
/// block including early returns.
///
/// # Example
///
/// ```rust
/// use timeline_tracer::{GlobalTracer, trace_scope};
///
/// fn load(path: &str) {
///     trace_scope!(GlobalTracer, "load", "path" => path);
///     // ...
/// }
/// # load("level.dat");
/// ```
#[macro_export]
macro_rules! trace_scope {
    ($tracer:expr, $name:expr $(, $key:expr => $value:expr)* $(,)?) => {
        let _trace_scope = {
            let tracer = &$tracer;
            if $crate::Tracer::is_enabled(tracer) {
                $crate::TraceScope::begin(tracer, $name, &[$(($key, $value)),*])
            } else {
                $crate::TraceScope::inactive(tracer)
            }
        };
    };
}

/// Name the calling thread in the exported document
///
/// # Example
///
/// ```rust
/// use timeline_tracer::{GlobalTracer, trace_thread_name};
///
/// trace_thread_name!(GlobalTracer, "loader");
/// ```
#[macro_export]
macro_rules! trace_thread_name {
    ($tracer:expr, $name:expr) => {{
        let tracer = &$tracer;
        if $crate::Tracer::is_enabled(tracer) {
            $crate::Tracer::set_thread_name(tracer, $name);
        }
    }};
}
