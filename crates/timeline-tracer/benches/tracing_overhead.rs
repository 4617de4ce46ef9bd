//! Benchmark tests for recording overhead

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use timeline_tracer::{
    ChromeTraceWriter, EventChunk, GlobalTracer, ThreadTrace, TraceConfig, TraceEvent,
    TraceSession, TraceSink, TraceSnapshot, TracingError, trace_scope,
};

const EVENTS_PER_BATCH: usize = 1_000;

struct NullSink;

impl TraceSink for NullSink {
    fn export(&mut self, _snapshot: &TraceSnapshot) -> Result<(), TracingError> {
        Ok(())
    }
}

fn session() -> TraceSession {
    match TraceSession::with_sink(TraceConfig::default(), Box::new(NullSink)) {
        Ok(session) => session,
        Err(e) => panic!("default configuration rejected: {e}"),
    }
}

fn bench_disabled(c: &mut Criterion) {
    c.bench_function("global_disabled_begin_end", |b| {
        b.iter(|| {
            timeline_tracer::global::record_begin(black_box("frame"), &[]);
            timeline_tracer::global::record_end(black_box("frame"));
        })
    });

    c.bench_function("global_disabled_scope_with_args", |b| {
        b.iter(|| {
            trace_scope!(GlobalTracer, "frame", "n" => black_box("1"));
        })
    });
}

fn bench_enabled(c: &mut Criterion) {
    c.bench_function("session_begin_end_x1000", |b| {
        b.iter_batched(
            session,
            |session| {
                for _ in 0..EVENTS_PER_BATCH {
                    session.record_begin(black_box("frame"), &[]);
                    session.record_end(black_box("frame"));
                }
                session
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("session_scope_with_args_x1000", |b| {
        b.iter_batched(
            session,
            |session| {
                for _ in 0..EVENTS_PER_BATCH {
                    trace_scope!(session, "load", "file" => black_box("x.dat"));
                }
                session
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_export(c: &mut Criterion) {
    let events = (0..EVENTS_PER_BATCH as u64)
        .map(|i| {
            if i % 2 == 0 {
                TraceEvent::begin("frame", vec![("n".to_owned(), i.to_string())], i * 1_000)
            } else {
                TraceEvent::end("frame", i * 1_000)
            }
        })
        .collect();
    let snapshot = TraceSnapshot::new(vec![ThreadTrace::new(
        "main",
        vec![EventChunk::sealed(events)],
    )]);
    let writer = ChromeTraceWriter::default();

    c.bench_function("chrome_write_x1000", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(128 * EVENTS_PER_BATCH);
            black_box(writer.write(&mut out, black_box(&snapshot)).ok());
            out
        })
    });
}

criterion_group!(benches, bench_disabled, bench_enabled, bench_export);

criterion_main!(benches);
