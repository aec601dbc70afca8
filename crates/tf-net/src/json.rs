//! JSON Lines sink.
//!
//! Each non-empty batch becomes one line:
//!
//! ```text
//! {"tick":12,"deltas":[{"id":1000,"health":75.0}],"removed":[]}
//! ```
//!
//! Full snapshots (client joins) use the same stream with a `snapshot` key so
//! a consumer can replay the file from the top.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use tf_agent::{AgentSnapshot, DeltaBatch};
use tf_core::Tick;

use crate::{DeltaSink, NetResult};

#[derive(Serialize)]
struct SnapshotLine<'a> {
    tick:     Tick,
    snapshot: &'a [AgentSnapshot],
}

pub struct JsonLinesSink<W: Write> {
    writer: W,
    lines:  u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create (or truncate) `path` behind a buffered writer.
    pub fn create(path: &Path) -> NetResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Write a full state line for every agent in `agents`.
    pub fn write_snapshot(&mut self, tick: Tick, agents: &[AgentSnapshot]) -> NetResult<()> {
        self.write_line(&SnapshotLine { tick, snapshot: agents })?;
        debug!(%tick, agents = agents.len(), "snapshot written");
        Ok(())
    }

    /// Lines written so far.
    #[inline]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> NetResult<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }
}

impl<W: Write> DeltaSink for JsonLinesSink<W> {
    fn publish(&mut self, batch: &DeltaBatch) -> NetResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.write_line(batch)
    }

    fn flush(&mut self) -> NetResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
