//! Trace event definitions

use core::fmt;

/// Ordered key/value annotations attached to a begin event
pub type TraceArgs = Vec<(String, String)>;

/// Whether an event opens or closes an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Interval start
    Begin,
    /// Interval end
    End,
}

impl EventKind {
    /// Phase marker used by the Chrome trace-event format
    #[inline]
    pub const fn phase(&self) -> &'static str {
        match self {
            EventKind::Begin => "B",
            EventKind::End => "E",
        }
    }
}

/// A single recorded event
///
/// Events are immutable once created. No parent/child relation is stored;
/// nesting is reconstructed by viewers from timestamp order and matching
/// names within a thread.
///
/// Timestamps are full-width nanosecond offsets from the session epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    kind: EventKind,
    timestamp_ns: u64,
    name: String,
    args: TraceArgs,
}

impl TraceEvent {
    /// Create a begin event
    pub fn begin(name: impl Into<String>, args: TraceArgs, timestamp_ns: u64) -> Self {
        Self {
            kind: EventKind::Begin,
            timestamp_ns,
            name: name.into(),
            args,
        }
    }

    /// Create an end event; end events never carry arguments
    pub fn end(name: impl Into<String>, timestamp_ns: u64) -> Self {
        Self {
            kind: EventKind::End,
            timestamp_ns,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Begin or end
    #[inline]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Nanoseconds since the session epoch
    #[inline]
    pub const fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    /// Microseconds since the session epoch, truncated
    #[inline]
    pub const fn timestamp_us(&self) -> u64 {
        self.timestamp_ns / 1000
    }

    /// Event name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Annotations, empty for end events
    #[inline]
    pub fn args(&self) -> &[(String, String)] {
        &self.args
    }

    /// Returns true for begin events
    #[inline]
    pub const fn is_begin(&self) -> bool {
        matches!(self.kind, EventKind::Begin)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Begin => f.write_str("Begin"),
            EventKind::End => f.write_str("End"),
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, ts={}ns", self.kind, self.name, self.timestamp_ns)?;
        for (key, value) in &self.args {
            write!(f, ", {key}={value}")?;
        }
        f.write_str(")")
    }
}
