//! Session configuration

use crate::TracingError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of events held by one chunk.
pub const DEFAULT_CHUNK_CAPACITY: usize = 100_000;

/// Default trace destination.
pub const DEFAULT_OUTPUT_PATH: &str = "timeline_trace.json";

/// Resolution of the exported `ts` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPrecision {
    /// Integer microseconds, nanoseconds truncated. Matches existing viewer tooling.
    #[default]
    Microseconds,
    /// Fractional microseconds carrying the full nanosecond value.
    Nanoseconds,
}

/// Configuration for a [`TraceSession`](crate::TraceSession).
///
/// All fields have defaults, so a partial JSON document is accepted:
///
/// ```rust
/// use timeline_tracer::TraceConfig;
///
/// let config = TraceConfig::from_json_str(r#"{"chunk_capacity": 4096}"#)?;
/// assert_eq!(config.chunk_capacity, 4096);
/// assert_eq!(config.process_id, 1);
/// # Ok::<(), timeline_tracer::TracingError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// File written by the default file sink on export
    pub output_path: PathBuf,
    /// Events per chunk before a new chunk is started
    pub chunk_capacity: usize,
    /// Constant `pid` written for every event
    pub process_id: u32,
    /// Exported timestamp resolution
    pub timestamp_precision: TimestampPrecision,
    /// Record a `TraceBuffer::new_chunk` begin/end pair whenever a chunk fills
    pub record_chunk_growth: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            process_id: 1,
            timestamp_precision: TimestampPrecision::Microseconds,
            record_chunk_growth: false,
        }
    }
}

impl TraceConfig {
    /// Set the output path
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Set the chunk capacity
    pub fn with_chunk_capacity(mut self, capacity: usize) -> Self {
        self.chunk_capacity = capacity;
        self
    }

    /// Set the exported process id
    pub fn with_process_id(mut self, pid: u32) -> Self {
        self.process_id = pid;
        self
    }

    /// Set the exported timestamp precision
    pub fn with_timestamp_precision(mut self, precision: TimestampPrecision) -> Self {
        self.timestamp_precision = precision;
        self
    }

    /// Enable or disable chunk growth meta-events
    pub fn with_chunk_growth_events(mut self, enabled: bool) -> Self {
        self.record_chunk_growth = enabled;
        self
    }

    /// Check the configuration for values the buffers cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::InvalidConfiguration`] when the chunk capacity
    /// is zero, or too small to hold the growth meta-events plus one event.
    pub fn validate(&self) -> Result<(), TracingError> {
        if self.chunk_capacity == 0 {
            return Err(TracingError::invalid_config("chunk_capacity must be > 0"));
        }
        if self.record_chunk_growth && self.chunk_capacity < 3 {
            return Err(TracingError::invalid_config(format!(
                "chunk_capacity {} cannot hold chunk growth events (minimum 3)",
                self.chunk_capacity
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, TracingError> {
        let config: TraceConfig = serde_json::from_str(json)
            .map_err(|e| TracingError::invalid_config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TracingError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TracingError::io(path, e))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TraceConfig::default();
        assert_eq!(config.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
        assert_eq!(config.process_id, 1);
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(config.timestamp_precision, TimestampPrecision::Microseconds);
        assert!(!config.record_chunk_growth);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = TraceConfig::default().with_chunk_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(TracingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_growth_events_need_room() {
        let config = TraceConfig::default()
            .with_chunk_capacity(2)
            .with_chunk_growth_events(true);
        assert!(config.validate().is_err());
        assert!(config.with_chunk_capacity(3).validate().is_ok());
    }

    #[test]
    fn test_partial_json() -> Result<(), TracingError> {
        let config = TraceConfig::from_json_str(
            r#"{"output_path": "out/t.json", "timestamp_precision": "nanoseconds"}"#,
        )?;
        assert_eq!(config.output_path, PathBuf::from("out/t.json"));
        assert_eq!(config.timestamp_precision, TimestampPrecision::Nanoseconds);
        assert_eq!(config.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
        Ok(())
    }

    #[test]
    fn test_invalid_json() {
        let result = TraceConfig::from_json_str(r#"{"chunk_capacity": "lots"}"#);
        assert!(matches!(result, Err(TracingError::InvalidConfiguration(_))));

        let result = TraceConfig::from_json_str(r#"{"chunk_capacity": 0}"#);
        assert!(matches!(result, Err(TracingError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = TraceConfig::load("/nonexistent/dir/trace-config.json");
        assert!(matches!(result, Err(TracingError::Io { .. })));
    }
}
