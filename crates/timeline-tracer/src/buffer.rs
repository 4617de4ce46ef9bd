//! Per-thread chunked event buffers
//!
//! A [`ThreadBuffer`] is appended to only by the thread it was created for.
//! Events land in fixed-capacity [`EventChunk`]s; when the current chunk is
//! full it is sealed and a fresh one is started, so earlier events are never
//! moved or copied.
//!
//! The buffer state sits behind a `parking_lot` mutex that is only ever
//! contended by the export walk, so the steady-state append is a single
//! uncontended acquire on memory owned by the recording thread.

use crate::{TraceClock, TraceEvent, events::TraceArgs};
use parking_lot::Mutex;

/// Name of the meta-event pair recorded when a chunk fills up.
pub const CHUNK_GROWTH_EVENT: &str = "TraceBuffer::new_chunk";

/// Fixed-capacity, append-only run of events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChunk {
    events: Vec<TraceEvent>,
    capacity: usize,
}

impl EventChunk {
    /// Create an empty chunk with room for `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Wrap already-recorded events in a full chunk
    pub fn sealed(events: Vec<TraceEvent>) -> Self {
        let capacity = events.len();
        Self { events, capacity }
    }

    /// Maximum number of events this chunk holds
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events stored
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns true once the chunk is sealed
    #[inline]
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.capacity
    }

    /// Events in append order
    #[inline]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Everything one thread recorded, detached from the live buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTrace {
    tid: String,
    chunks: Vec<EventChunk>,
}

impl ThreadTrace {
    /// Build a thread trace from already-recorded chunks
    pub fn new(tid: impl Into<String>, chunks: Vec<EventChunk>) -> Self {
        Self {
            tid: tid.into(),
            chunks,
        }
    }

    /// Display identifier of the owning thread
    #[inline]
    pub fn tid(&self) -> &str {
        &self.tid
    }

    /// Chunks in creation order
    #[inline]
    pub fn chunks(&self) -> &[EventChunk] {
        &self.chunks
    }

    /// Events in recording order across all chunks
    pub fn events(&self) -> impl Iterator<Item = &TraceEvent> {
        self.chunks.iter().flat_map(|chunk| chunk.events().iter())
    }

    /// Total number of events
    pub fn event_count(&self) -> usize {
        self.chunks.iter().map(EventChunk::len).sum()
    }
}

#[derive(Debug)]
struct BufferState {
    tid: String,
    chunks: Vec<EventChunk>,
    events_recorded: u64,
    chunks_allocated: u64,
}

impl BufferState {
    fn start_chunk(&mut self, capacity: usize) {
        self.chunks.push(EventChunk::with_capacity(capacity));
        self.chunks_allocated = self.chunks_allocated.saturating_add(1);
    }

    fn push(&mut self, event: TraceEvent) {
        if let Some(chunk) = self.chunks.last_mut() {
            chunk.push(event);
            self.events_recorded = self.events_recorded.saturating_add(1);
        }
    }
}

/// Event buffer owned by the registry on behalf of one thread
#[derive(Debug)]
pub struct ThreadBuffer {
    clock: TraceClock,
    chunk_capacity: usize,
    record_growth: bool,
    state: Mutex<BufferState>,
}

impl ThreadBuffer {
    /// Create a buffer with one empty chunk
    pub(crate) fn new(
        tid: String,
        clock: TraceClock,
        chunk_capacity: usize,
        record_growth: bool,
    ) -> Self {
        let mut state = BufferState {
            tid,
            chunks: Vec::new(),
            events_recorded: 0,
            chunks_allocated: 0,
        };
        state.start_chunk(chunk_capacity);
        Self {
            clock,
            chunk_capacity,
            record_growth,
            state: Mutex::new(state),
        }
    }

    /// Current display identifier
    pub fn tid(&self) -> String {
        self.state.lock().tid.clone()
    }

    /// Rebind the display identifier
    pub fn set_tid(&self, tid: impl Into<String>) {
        self.state.lock().tid = tid.into();
    }

    /// Append a begin event stamped with the current time
    pub fn record_begin(&self, name: &str, args: &[(&str, &str)]) {
        let args: TraceArgs = args
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        let event = TraceEvent::begin(name, args, self.clock.now_ns());
        self.push(event);
    }

    /// Append an end event stamped with the current time
    pub fn record_end(&self, name: &str) {
        let event = TraceEvent::end(name, self.clock.now_ns());
        self.push(event);
    }

    /// Append an already-built event
    pub fn push(&self, event: TraceEvent) {
        let mut state = self.state.lock();
        match state.chunks.last().map(EventChunk::is_full) {
            Some(false) => {}
            Some(true) => {
                state.start_chunk(self.chunk_capacity);
                tracing::debug!(
                    tid = %state.tid,
                    chunks = state.chunks.len(),
                    capacity = self.chunk_capacity,
                    "Trace buffer sealed a full chunk"
                );
                if self.record_growth {
                    let ts = event.timestamp_ns();
                    state.push(TraceEvent::begin(CHUNK_GROWTH_EVENT, Vec::new(), ts));
                    state.push(TraceEvent::end(CHUNK_GROWTH_EVENT, ts));
                }
            }
            // drained by an export; start over without a growth marker
            None => state.start_chunk(self.chunk_capacity),
        }
        state.push(event);
    }

    /// Detach all recorded chunks, leaving the buffer empty
    pub fn drain(&self) -> ThreadTrace {
        let mut state = self.state.lock();
        let chunks = std::mem::take(&mut state.chunks);
        ThreadTrace::new(state.tid.clone(), chunks)
    }

    /// `(events recorded, chunks allocated)` over the buffer's lifetime
    pub fn counters(&self) -> (u64, u64) {
        let state = self.state.lock();
        (state.events_recorded, state.chunks_allocated)
    }
}

/// Identifier used until a thread names itself
pub fn default_thread_label() -> String {
    format!("{:?}", std::thread::current().id())
}
