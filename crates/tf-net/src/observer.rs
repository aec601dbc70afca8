//! `PublishObserver<S>`: bridges `SimObserver` to a [`DeltaSink`].

use std::io::Write;

use tracing::warn;

use tf_agent::DeltaBatch;
use tf_core::Tick;
use tf_sim::{SimObserver, TickStats};

use crate::csv::TickCsvWriter;
use crate::{DeltaSink, NetError, NetResult, TickSummaryRow};

/// A [`SimObserver`] that forwards every published batch to a sink and,
/// optionally, writes one diagnostics row per tick.
///
/// Errors are stored internally because `SimObserver` methods have no return
/// value.  After the run, check with [`take_error`][Self::take_error].  Only
/// the first error is kept; later batches are still offered to the sink.
pub struct PublishObserver<S: DeltaSink> {
    sink:        S,
    diagnostics: Option<TickCsvWriter<Box<dyn Write>>>,
    published:   u64,
    last_error:  Option<NetError>,
}

impl<S: DeltaSink> PublishObserver<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            diagnostics: None,
            published:   0,
            last_error:  None,
        }
    }

    /// Also write a [`TickSummaryRow`] per tick to `writer`, as CSV.
    ///
    /// # Errors
    /// Writing the header row failed.
    pub fn with_diagnostics(mut self, writer: impl Write + 'static) -> NetResult<Self> {
        let writer: Box<dyn Write> = Box::new(writer);
        self.diagnostics = Some(TickCsvWriter::from_writer(writer)?);
        Ok(self)
    }

    /// Batches handed to the sink, empty ones excluded.
    #[inline]
    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Take the stored error, if any.
    pub fn take_error(&mut self) -> Option<NetError> {
        self.last_error.take()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn store_err(&mut self, result: NetResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                warn!(err = %e, "publish sink failed; keeping first error");
                self.last_error = Some(e);
            }
        }
    }
}

impl<S: DeltaSink> SimObserver for PublishObserver<S> {
    fn on_publish(&mut self, batch: &DeltaBatch) {
        if batch.is_empty() {
            return;
        }
        let result = self.sink.publish(batch);
        if result.is_ok() {
            self.published += 1;
        }
        self.store_err(result);
    }

    fn on_tick_end(&mut self, stats: &TickStats) {
        let Some(diag) = self.diagnostics.as_mut() else { return };
        let result = diag.write_row(&TickSummaryRow::from(stats));
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.sink.flush();
        self.store_err(result);
        if let Some(diag) = self.diagnostics.as_mut() {
            let result = diag.finish();
            self.store_err(result);
        }
    }
}
