//! Prelude for timeline-tracer
//!
//! This module re-exports the most commonly used types and macros.
//!
//! # Example
//!
//! ```rust,no_run
//! use timeline_tracer::prelude::*;
//!
//! let session = TraceSession::enable(TraceConfig::default())?;
//! trace_scope!(session, "startup");
//! # Ok::<(), TracingError>(())
//! ```

pub use crate::{
    GlobalTracer, TimestampPrecision, TraceConfig, TraceScope, TraceSession, TraceSink, Tracer,
    TracingError, TracingMetrics, global, trace_begin, trace_end, trace_scope, trace_thread_name,
};
