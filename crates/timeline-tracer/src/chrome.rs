//! Chrome trace-event JSON serializer
//!
//! Produces the document understood by `chrome://tracing`, Perfetto and
//! Speedscope:
//!
//! ```text
//! {"traceEvents":[
//! {"pid":1,"tid":"main","ts":12,"name":"load","ph":"B","args":{"file":"x.dat"}},
//! {"pid":1,"tid":"main","ts":40,"name":"load","ph":"E"}
//! ]}
//! ```
//!
//! Field names, their order and the `B`/`E` phase vocabulary are a fixed
//! external contract. `args` is written only for begin events that carry at
//! least one pair. With [`TimestampPrecision::Microseconds`] the nanosecond
//! timestamps are truncated by integer division, which is lossy.

use crate::{TimestampPrecision, TraceConfig, TraceEvent, TraceSnapshot, TracingError};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::{self, Write};

/// Writes a [`TraceSnapshot`] as one Chrome trace document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeTraceWriter {
    process_id: u32,
    precision: TimestampPrecision,
}

impl Default for ChromeTraceWriter {
    fn default() -> Self {
        Self::new(1, TimestampPrecision::Microseconds)
    }
}

impl ChromeTraceWriter {
    /// Create a writer with an explicit pid and timestamp precision
    pub fn new(process_id: u32, precision: TimestampPrecision) -> Self {
        Self {
            process_id,
            precision,
        }
    }

    /// Create a writer matching a session configuration
    pub fn from_config(config: &TraceConfig) -> Self {
        Self::new(config.process_id, config.timestamp_precision)
    }

    /// Serialize every event in the snapshot, returning the event count
    ///
    /// The output is flushed before returning. Nothing is rolled back if a
    /// write fails part way.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error raised by `out`.
    pub fn write<W: Write>(&self, mut out: W, snapshot: &TraceSnapshot) -> io::Result<usize> {
        out.write_all(b"{\"traceEvents\":[\n")?;
        let mut written = 0usize;
        for (tid, event) in snapshot.events() {
            if written > 0 {
                out.write_all(b",\n")?;
            }
            serde_json::to_writer(&mut out, &self.entry(tid, event))?;
            written = written.saturating_add(1);
        }
        if written > 0 {
            out.write_all(b"\n")?;
        }
        out.write_all(b"]}\n")?;
        out.flush()?;
        Ok(written)
    }

    /// Render the snapshot into an in-memory string
    ///
    /// # Errors
    ///
    /// Returns an error if an event cannot be encoded.
    pub fn render(&self, snapshot: &TraceSnapshot) -> Result<String, TracingError> {
        let mut buf = Vec::new();
        self.write(&mut buf, snapshot)
            .map_err(|e| TracingError::Serialization(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TracingError::Serialization(e.to_string()))
    }

    fn entry<'a>(&self, tid: &'a str, event: &'a TraceEvent) -> ChromeEvent<'a> {
        let ts = match self.precision {
            TimestampPrecision::Microseconds => Timestamp::Micros(event.timestamp_us()),
            TimestampPrecision::Nanoseconds => {
                Timestamp::FractionalMicros(event.timestamp_ns() as f64 / 1000.0)
            }
        };
        let args: &[(String, String)] = if event.is_begin() { event.args() } else { &[] };
        ChromeEvent {
            pid: self.process_id,
            tid,
            ts,
            name: event.name(),
            ph: event.kind().phase(),
            args: OrderedArgs(args),
        }
    }
}

#[derive(serde::Serialize)]
struct ChromeEvent<'a> {
    pid: u32,
    tid: &'a str,
    ts: Timestamp,
    name: &'a str,
    ph: &'static str,
    #[serde(skip_serializing_if = "OrderedArgs::is_empty")]
    args: OrderedArgs<'a>,
}

enum Timestamp {
    Micros(u64),
    FractionalMicros(f64),
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Timestamp::Micros(us) => serializer.serialize_u64(*us),
            Timestamp::FractionalMicros(us) => serializer.serialize_f64(*us),
        }
    }
}

/// Args as a JSON object, keeping insertion order
struct OrderedArgs<'a>(&'a [(String, String)]);

impl OrderedArgs<'_> {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for OrderedArgs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventChunk, ThreadTrace};

    fn snapshot(tid: &str, events: Vec<TraceEvent>) -> TraceSnapshot {
        TraceSnapshot::new(vec![ThreadTrace::new(tid, vec![EventChunk::sealed(events)])])
    }

    #[test]
    fn test_empty_document() -> Result<(), TracingError> {
        let out = ChromeTraceWriter::default().render(&TraceSnapshot::default())?;
        assert_eq!(out, "{\"traceEvents\":[\n]}\n");
        Ok(())
    }

    #[test]
    fn test_begin_end_shape() -> Result<(), TracingError> {
        let snap = snapshot(
            "main",
            vec![
                TraceEvent::begin("load", vec![("file".into(), "x.dat".into())], 12_999),
                TraceEvent::end("load", 40_000),
            ],
        );
        let out = ChromeTraceWriter::default().render(&snap)?;
        assert_eq!(
            out,
            "{\"traceEvents\":[\n\
             {\"pid\":1,\"tid\":\"main\",\"ts\":12,\"name\":\"load\",\"ph\":\"B\",\"args\":{\"file\":\"x.dat\"}},\n\
             {\"pid\":1,\"tid\":\"main\",\"ts\":40,\"name\":\"load\",\"ph\":\"E\"}\n\
             ]}\n"
        );
        Ok(())
    }

    #[test]
    fn test_empty_args_are_omitted() -> Result<(), TracingError> {
        let snap = snapshot("t", vec![TraceEvent::begin("idle", Vec::new(), 0)]);
        let out = ChromeTraceWriter::default().render(&snap)?;
        assert!(!out.contains("args"));
        Ok(())
    }

    #[test]
    fn test_names_are_escaped() -> Result<(), TracingError> {
        let snap = snapshot("t\"1", vec![TraceEvent::end("say \"hi\"", 0)]);
        let out = ChromeTraceWriter::default().render(&snap)?;
        assert!(out.contains(r#""tid":"t\"1""#));
        assert!(out.contains(r#""name":"say \"hi\"""#));
        Ok(())
    }

    #[test]
    fn test_nanosecond_precision() -> Result<(), TracingError> {
        let snap = snapshot("t", vec![TraceEvent::end("x", 1_234_567)]);
        let writer = ChromeTraceWriter::new(7, TimestampPrecision::Nanoseconds);
        let out = writer.render(&snap)?;
        assert!(out.contains("\"pid\":7"));
        assert!(out.contains("\"ts\":1234.567"));
        Ok(())
    }

    #[test]
    fn test_write_reports_event_count() -> Result<(), Box<dyn std::error::Error>> {
        let snap = snapshot(
            "t",
            vec![TraceEvent::begin("a", Vec::new(), 1), TraceEvent::end("a", 2)],
        );
        let mut out = Vec::new();
        let count = ChromeTraceWriter::default().write(&mut out, &snap)?;
        assert_eq!(count, 2);
        let parsed: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(parsed["traceEvents"].as_array().map(Vec::len), Some(2));
        Ok(())
    }
}
