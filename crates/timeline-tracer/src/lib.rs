//! Chunked per-thread timeline tracing with Chrome trace export
//!
//! Instrumented code records begin/end events into a buffer owned by the
//! calling thread. Buffers grow in fixed-size chunks so recording never moves
//! earlier events, and threads never contend with each other while a session
//! is enabled. Disabling the session drains every buffer, including those of
//! threads that have already exited, and writes one Chrome trace JSON document
//! viewable in `chrome://tracing` or Perfetto.
//!
//! # Recording Cost
//!
//! - Disabled: one atomic load, no allocation
//! - Enabled: a clock read, the event's string copies and an uncontended lock
//!   on the thread's own buffer
//! - Chunk rollover: one allocation every `chunk_capacity` events
//!
//! # Example
//!
//! ```rust,no_run
//! use timeline_tracer::{TraceConfig, TraceSession, trace_scope};
//!
//! let session = TraceSession::enable(TraceConfig::default().with_output_path("load.json"))?;
//!
//! {
//!     trace_scope!(session, "load_level", "name" => "city");
//!     // ...
//! }
//!
//! let metrics = session.disable()?;
//! println!("{metrics}");
//! # Ok::<(), timeline_tracer::TracingError>(())
//! ```
//!
//! For code that cannot have a session passed to it, [`global`] holds one
//! process-wide session behind [`GlobalTracer`].

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod buffer;
pub mod chrome;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod global;
pub mod macros;
pub mod metrics;
pub mod prelude;
pub mod registry;
pub mod scope;
pub mod session;
pub mod sink;

pub use buffer::{CHUNK_GROWTH_EVENT, EventChunk, ThreadBuffer, ThreadTrace};
pub use chrome::ChromeTraceWriter;
pub use clock::TraceClock;
pub use config::{TimestampPrecision, TraceConfig};
pub use error::TracingError;
pub use events::{EventKind, TraceArgs, TraceEvent};
pub use global::{GlobalSessionGuard, GlobalTracer};
pub use metrics::TracingMetrics;
pub use registry::{TraceRegistry, TraceSnapshot};
pub use scope::{TraceScope, Tracer};
pub use session::TraceSession;
pub use sink::{FileSink, TraceSink, WriterSink};
