//! CSV tick diagnostics.
//!
//! One row per processed tick, written to `tick_summaries.csv` (or any
//! `io::Write`).  Useful for spotting overruns and fault storms offline.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::{NetError, NetResult, TickSummaryRow};

pub struct TickCsvWriter<W: Write> {
    inner:    Writer<W>,
    rows:     u64,
    finished: bool,
}

impl TickCsvWriter<File> {
    /// Create (or truncate) `tick_summaries.csv` in `dir` and write the header.
    pub fn create(dir: &Path) -> NetResult<Self> {
        Self::from_writer(File::create(dir.join("tick_summaries.csv"))?)
    }
}

impl<W: Write> TickCsvWriter<W> {
    pub fn from_writer(writer: W) -> NetResult<Self> {
        let mut inner = Writer::from_writer(writer);
        inner.write_record(TickSummaryRow::HEADERS)?;
        Ok(Self { inner, rows: 0, finished: false })
    }

    pub fn write_row(&mut self, row: &TickSummaryRow) -> NetResult<()> {
        self.inner.write_record(row.to_record())?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded.
    #[inline]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush buffered rows.  Idempotent.
    pub fn finish(&mut self) -> NetResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> NetResult<W> {
        self.inner.into_inner().map_err(|e| NetError::Io(e.into_error()))
    }
}
