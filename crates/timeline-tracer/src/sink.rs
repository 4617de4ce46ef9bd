//! Trace output sinks

use crate::{ChromeTraceWriter, TraceConfig, TraceSnapshot, TracingError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for a finished session
///
/// A sink receives the drained snapshot exactly once per session, after every
/// registry lock has been released, so implementations are free to block on
/// I/O.
pub trait TraceSink: Send {
    /// Write the complete session out
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be opened or written.
    /// Partial output is not rolled back.
    fn export(&mut self, snapshot: &TraceSnapshot) -> Result<(), TracingError>;
}

/// Create the sink described by a configuration
///
/// This is a [`FileSink`] at [`TraceConfig::output_path`].
pub fn create_default_sink(config: &TraceConfig) -> Box<dyn TraceSink> {
    Box::new(FileSink::from_config(config))
}

/// Writes the Chrome trace document to a file
///
/// The file is created (or truncated) at export time, flushed and synced to
/// disk before the handle is released. Replacement is not atomic.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    writer: ChromeTraceWriter,
}

impl FileSink {
    /// Create a sink for `path`
    pub fn new(path: impl Into<PathBuf>, writer: ChromeTraceWriter) -> Self {
        Self {
            path: path.into(),
            writer,
        }
    }

    /// Create a sink for the configured output path and format
    pub fn from_config(config: &TraceConfig) -> Self {
        Self::new(
            config.output_path.clone(),
            ChromeTraceWriter::from_config(config),
        )
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TraceSink for FileSink {
    fn export(&mut self, snapshot: &TraceSnapshot) -> Result<(), TracingError> {
        let file = File::create(&self.path).map_err(|e| TracingError::io(&self.path, e))?;
        let mut out = BufWriter::new(file);
        let events = self
            .writer
            .write(&mut out, snapshot)
            .map_err(|e| TracingError::io(&self.path, e))?;
        let file = out
            .into_inner()
            .map_err(|e| TracingError::io(&self.path, e.into_error()))?;
        file.sync_all()
            .map_err(|e| TracingError::io(&self.path, e))?;

        tracing::info!(
            path = %self.path.display(),
            events,
            threads = snapshot.threads().len(),
            chunks = snapshot.chunk_count(),
            "Trace written"
        );
        Ok(())
    }
}

/// Writes the Chrome trace document to any [`Write`] implementation
#[derive(Debug)]
pub struct WriterSink<W> {
    out: W,
    writer: ChromeTraceWriter,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap `out`
    pub fn new(out: W, writer: ChromeTraceWriter) -> Self {
        Self { out, writer }
    }

    /// Recover the wrapped writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TraceSink for WriterSink<W> {
    fn export(&mut self, snapshot: &TraceSnapshot) -> Result<(), TracingError> {
        let events = self
            .writer
            .write(&mut self.out, snapshot)
            .map_err(|e| TracingError::Serialization(e.to_string()))?;
        tracing::debug!(events, "Trace written to stream");
        Ok(())
    }
}
