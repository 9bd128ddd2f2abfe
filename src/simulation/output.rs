//! Record output sinks
//!
//! Writes the generated streams as JSON lines and semi-structured text
//! lines, either under an output directory or to stdout. Write failures
//! get a bounded retry; a record that still cannot be written is dropped,
//! counted and logged, and generation continues.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::simulation::{ErrorHandler, RecoveryContext, SimulationError, SimulationResult};

/// Write retries before a record is dropped
const WRITE_RETRIES: usize = 2;

/// Output sink for generated streams
#[derive(Debug)]
pub struct RecordSink {
    output_dir: Option<PathBuf>,
    error_handler: ErrorHandler,
    dropped: usize,
}

impl RecordSink {
    /// Create a sink writing under `output_dir`, or to stdout when `None`
    pub fn new(output_dir: Option<&str>) -> SimulationResult<Self> {
        let output_dir = match output_dir {
            Some(dir) => {
                let path = PathBuf::from(dir);
                fs::create_dir_all(&path)?;
                Some(path)
            }
            None => None,
        };
        Ok(Self { output_dir, error_handler: ErrorHandler::new(), dropped: 0 })
    }

    /// Number of records dropped after exhausting write retries
    pub fn dropped_records(&self) -> usize {
        self.dropped
    }

    /// Write one stream as JSON lines to `<stream>.jsonl`
    pub fn write_jsonl<T: Serialize>(
        &mut self,
        stream: &str,
        records: &[T],
    ) -> SimulationResult<usize> {
        let mut writer = self.open(stream, "jsonl")?;
        let mut written = 0;

        for record in records {
            let line = match serde_json::to_string(record) {
                Ok(line) => line,
                Err(e) => {
                    warn!(stream, error = %e, "record dropped: serialization failed");
                    self.dropped += 1;
                    continue;
                }
            };
            if self.try_write_line(&mut writer, stream, &line)? {
                written += 1;
            }
        }

        writer.flush()?;
        info!(stream, written, "json stream written");
        Ok(written)
    }

    /// Write one stream as pre-rendered text lines to `<stream>.log`
    pub fn write_text(&mut self, stream: &str, lines: &[String]) -> SimulationResult<usize> {
        let mut writer = self.open(stream, "log")?;
        let mut written = 0;

        for line in lines {
            if self.try_write_line(&mut writer, stream, line)? {
                written += 1;
            }
        }

        writer.flush()?;
        info!(stream, written, "text stream written");
        Ok(written)
    }

    fn open(&self, stream: &str, extension: &str) -> SimulationResult<Box<dyn Write>> {
        match &self.output_dir {
            Some(dir) => {
                let path = dir.join(format!("{stream}.{extension}"));
                let file = File::create(path)?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }

    /// Write one line, retrying on failure; returns false when the record
    /// was dropped after its retries ran out.
    fn try_write_line(
        &mut self,
        writer: &mut Box<dyn Write>,
        stream: &str,
        line: &str,
    ) -> SimulationResult<bool> {
        let outcome = self.error_handler.execute_with_recovery(
            || {
                writeln!(writer, "{line}")
                    .map_err(|e| SimulationError::schema_write_error(stream, e.to_string()))
            },
            RecoveryContext::retry(WRITE_RETRIES).with_context(format!("writing {stream} stream")),
        )?;

        if outcome.is_none() {
            self.dropped += 1;
            warn!(stream, "record dropped after {} retries", WRITE_RETRIES);
            return Ok(false);
        }
        Ok(true)
    }
}
