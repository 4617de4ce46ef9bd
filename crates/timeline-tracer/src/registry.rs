//! Session-wide registry of thread buffers
//!
//! The registry owns every [`ThreadBuffer`] created during a session, including
//! those whose threads have already exited. Threads keep only a `Weak` handle
//! in thread-local storage, keyed by registry id, so one thread can record into
//! several live sessions and stale handles from finished sessions are pruned
//! lazily.

use crate::{
    TraceClock, TraceConfig, TraceEvent, TracingMetrics,
    buffer::{ThreadBuffer, ThreadTrace, default_thread_label},
};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CACHED_BUFFERS: RefCell<Vec<CachedBuffer>> = const { RefCell::new(Vec::new()) };
}

struct CachedBuffer {
    registry_id: u64,
    buffer: Weak<ThreadBuffer>,
}

/// Look up the calling thread's cached buffer for a registry without locking
///
/// Returns `None` on a cache miss, when the registry is gone, or while the
/// thread's locals are being torn down.
pub(crate) fn cached_buffer(registry_id: u64) -> Option<Arc<ThreadBuffer>> {
    CACHED_BUFFERS
        .try_with(|cache| {
            let cache = cache.try_borrow().ok()?;
            let buffer = cache
                .iter()
                .find(|entry| entry.registry_id == registry_id)
                .and_then(|entry| entry.buffer.upgrade());
            buffer
        })
        .ok()
        .flatten()
}

fn cache_buffer(registry_id: u64, buffer: &Arc<ThreadBuffer>) -> bool {
    CACHED_BUFFERS
        .try_with(|cache| {
            let Ok(mut cache) = cache.try_borrow_mut() else {
                return false;
            };
            cache.retain(|entry| entry.buffer.strong_count() > 0);
            cache.push(CachedBuffer {
                registry_id,
                buffer: Arc::downgrade(buffer),
            });
            true
        })
        .unwrap_or(false)
}

/// Owner of all thread buffers for one session
#[derive(Debug)]
pub struct TraceRegistry {
    id: u64,
    clock: TraceClock,
    chunk_capacity: usize,
    record_growth: bool,
    buffers: Mutex<Vec<Arc<ThreadBuffer>>>,
}

impl TraceRegistry {
    /// Create an empty registry whose buffers stamp events against `clock`
    pub fn new(config: &TraceConfig, clock: TraceClock) -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            clock,
            chunk_capacity: config.chunk_capacity,
            record_growth: config.record_chunk_growth,
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Process-unique registry id
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Clock shared by every buffer in this registry
    #[inline]
    pub fn clock(&self) -> TraceClock {
        self.clock
    }

    /// Get the calling thread's buffer, registering one on first use
    ///
    /// Only the first call per thread takes the registry lock. Returns `None`
    /// when called from a thread-local destructor, where the cache is no
    /// longer reachable.
    pub fn buffer_for_current_thread(&self) -> Option<Arc<ThreadBuffer>> {
        if let Some(buffer) = cached_buffer(self.id) {
            return Some(buffer);
        }

        let buffer = Arc::new(ThreadBuffer::new(
            default_thread_label(),
            self.clock,
            self.chunk_capacity,
            self.record_growth,
        ));
        if !cache_buffer(self.id, &buffer) {
            return None;
        }

        let threads = {
            let mut buffers = self.buffers.lock();
            buffers.push(Arc::clone(&buffer));
            buffers.len()
        };
        tracing::debug!(
            registry = self.id,
            tid = %buffer.tid(),
            threads,
            "Registered trace buffer for thread"
        );
        Some(buffer)
    }

    /// Number of registered thread buffers
    pub fn thread_count(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Detach every buffer's chunks in registration order
    ///
    /// The registry lock is held for the walk so no thread can register
    /// mid-drain; the returned snapshot is private and can be written out
    /// without any lock.
    pub fn drain(&self) -> TraceSnapshot {
        let buffers = self.buffers.lock();
        let threads = buffers.iter().map(|buffer| buffer.drain()).collect();
        TraceSnapshot::new(threads)
    }

    /// Aggregate counters over all registered buffers
    pub fn metrics(&self) -> TracingMetrics {
        let buffers = self.buffers.lock();
        let mut metrics = TracingMetrics::new();
        for buffer in buffers.iter() {
            let (events, chunks) = buffer.counters();
            metrics.record_thread(events, chunks);
        }
        metrics
    }
}

/// Flattened, stable view of a drained session
///
/// Iteration order is threads in registration order, then chunks in creation
/// order, then events in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSnapshot {
    threads: Vec<ThreadTrace>,
}

impl TraceSnapshot {
    /// Build a snapshot from per-thread traces
    pub fn new(threads: Vec<ThreadTrace>) -> Self {
        Self { threads }
    }

    /// Per-thread traces in registration order
    #[inline]
    pub fn threads(&self) -> &[ThreadTrace] {
        &self.threads
    }

    /// First thread trace with the given identifier
    pub fn thread(&self, tid: &str) -> Option<&ThreadTrace> {
        self.threads.iter().find(|thread| thread.tid() == tid)
    }

    /// Every event paired with its thread identifier
    pub fn events(&self) -> impl Iterator<Item = (&str, &TraceEvent)> {
        self.threads
            .iter()
            .flat_map(|thread| thread.events().map(move |event| (thread.tid(), event)))
    }

    /// Total number of events
    pub fn event_count(&self) -> usize {
        self.threads.iter().map(ThreadTrace::event_count).sum()
    }

    /// Total number of chunks
    pub fn chunk_count(&self) -> usize {
        self.threads.iter().map(|thread| thread.chunks().len()).sum()
    }

    /// Returns true if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }
}
