#![warn(missing_docs)]
//! Deterministic testing surfaces: controllable time, engine/host doubles and
//! tick log plumbing.

mod doubles;
mod metrics;

use anyhow::Result;
use mapshim_core::MonotonicClock;
use mapshim_tick::TickSample;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub use doubles::*;
pub use metrics::*;

/// Clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock reading `nanos`.
    pub fn starting_at(nanos: u64) -> Self {
        let clock = Self::new();
        clock.set_nanos(nanos);
        clock
    }

    /// Jump to an absolute reading (may go backwards).
    pub fn set_nanos(&self, nanos: u64) {
        self.now.store(nanos, Ordering::SeqCst);
    }

    /// Move forward by `nanos`, saturating.
    pub fn advance_nanos(&self, nanos: u64) {
        let now = self.now.load(Ordering::SeqCst);
        self.set_nanos(now.saturating_add(nanos));
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.advance_nanos(u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX));
    }
}

impl MonotonicClock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A sink that writes one JSON tick sample per line.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Create a new sink at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append a sample to the log.
    pub fn write(&mut self, sample: &TickSample) -> Result<()> {
        serde_json::to_writer(&mut self.writer, sample)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
