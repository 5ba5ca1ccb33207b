//! Record log: one JSON line per cycle for downstream consumers.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::collector::MetricsRecord;
use crate::monitor::RecordSink;

/// Logger appending serialized records to a JSON Lines file.
pub struct MetricsLogger {
    writer: BufWriter<File>,
    samples_written: u64,
}

impl MetricsLogger {
    /// Create a new logger writing to the specified file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path.as_ref())
            .context("Failed to create record log file")?;

        Ok(Self {
            writer: BufWriter::new(file),
            samples_written: 0,
        })
    }

    /// Append a record to the log file
    pub fn log(&mut self, record: &MetricsRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.samples_written += 1;

        // Flush every 10 samples to avoid losing data on crash
        if self.samples_written % 10 == 0 {
            self.writer.flush()?;
        }

        Ok(())
    }

    /// Flush any buffered data
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Get the number of records written
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }
}

impl RecordSink for MetricsLogger {
    fn emit(&mut self, record: &MetricsRecord) -> Result<()> {
        self.log(record)
    }
}

impl Drop for MetricsLogger {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
